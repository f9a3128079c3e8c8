//! Property accessor recognition.
//!
//! Classifies a method as a getter, a setter, an ordinary non-accessor
//! method, or a malformed accessor, by name and signature convention.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::schema::MethodDecl;
use crate::model::types::{Scalar, ValueType};
use crate::util::Name;

/// The shape a stripped accessor suffix must take to name a property.
static PROPERTY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9_]*$").unwrap());

/// Which accessor of a property a method is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Getter,
    Setter,
}

/// The outcome of classifying one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A well-formed getter for the named property.
    Getter { property: Name },
    /// A well-formed setter for the named property.
    Setter { property: Name },
    /// Not accessor-shaped at all; an ordinary method.
    NotAccessor,
    /// Accessor-shaped but breaking a signature rule.
    Malformed { reason: String },
}

/// Classify a method declaration by accessor convention.
///
/// `get<Name>()` with a non-void return is a getter; `is<Name>()` is a
/// getter only when it returns primitive `boolean`; `set<Name>(value)`
/// with a void return is a setter. A stripped suffix that does not name a
/// property (empty, or starting lowercase, as in `getccCompiler`) makes
/// the method an ordinary non-accessor.
pub fn classify(method: &MethodDecl) -> Classification {
    let name = method.name.as_str();

    if let Some(suffix) = name.strip_prefix("get") {
        if !is_property_suffix(suffix) {
            return Classification::NotAccessor;
        }
        if !method.params.is_empty() {
            return Classification::Malformed {
                reason: "it must not take parameters".to_string(),
            };
        }
        if method.return_type == ValueType::Void {
            // A void `get` is not accessor-shaped; it falls through to
            // ordinary-method handling.
            return Classification::NotAccessor;
        }
        return Classification::Getter {
            property: Name::new(suffix).decapitalized(),
        };
    }

    if let Some(suffix) = name.strip_prefix("is") {
        if !is_property_suffix(suffix) {
            return Classification::NotAccessor;
        }
        if !method.params.is_empty() {
            return Classification::Malformed {
                reason: "it must not take parameters".to_string(),
            };
        }
        if method.return_type != ValueType::Scalar(Scalar::Bool) {
            return Classification::Malformed {
                reason: format!(
                    "it should either return 'boolean', or its name should be 'get{}()'",
                    suffix
                ),
            };
        }
        return Classification::Getter {
            property: Name::new(suffix).decapitalized(),
        };
    }

    if let Some(suffix) = name.strip_prefix("set") {
        if !is_property_suffix(suffix) {
            return Classification::NotAccessor;
        }
        if method.params.len() != 1 {
            return Classification::Malformed {
                reason: "it must take exactly one parameter".to_string(),
            };
        }
        if method.return_type != ValueType::Void {
            return Classification::Malformed {
                reason: "it must have void return type".to_string(),
            };
        }
        return Classification::Setter {
            property: Name::new(suffix).decapitalized(),
        };
    }

    Classification::NotAccessor
}

fn is_property_suffix(suffix: &str) -> bool {
    PROPERTY_SUFFIX.is_match(suffix)
}
