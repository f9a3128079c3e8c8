//! Reduction of candidate view types to their minimal covering set.
//!
//! When several view types are supplied, some may be supertypes of others
//! (redundant) and some mutually unrelated (each contributes
//! independently). The converged set keeps only the most specific types,
//! preserving first-occurrence order for independent branches.

use crate::model::schema::{is_assignable_from, SchemaProvider};
use crate::model::types::ModelType;

/// Compute the minimal subset of `types` such that every input is
/// assignable to at least one result, and no result is assignable to
/// another result.
pub fn find_converging_types(
    types: &[ModelType],
    provider: &dyn SchemaProvider,
) -> Vec<ModelType> {
    let mut result: Vec<ModelType> = Vec::new();

    for &candidate in types {
        // A candidate that is a supertype of (or equal to) something
        // already accumulated adds nothing.
        if result
            .iter()
            .any(|&kept| is_assignable_from(provider, candidate, kept))
        {
            continue;
        }

        // Replace the first accumulated supertype of the candidate in
        // place, then drop any further ones the candidate also covers.
        if let Some(pos) = result
            .iter()
            .position(|&kept| is_assignable_from(provider, kept, candidate))
        {
            result[pos] = candidate;
            result.retain(|&kept| {
                kept == candidate || !is_assignable_from(provider, kept, candidate)
            });
        } else {
            result.push(candidate);
        }
    }

    result
}
