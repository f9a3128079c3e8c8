//! High-level operations.
//!
//! This module contains the implementation of Gantry commands.

pub mod check;
pub mod describe;

pub use check::{check_models, format_report, ModelReport, TypeOutcome};
pub use describe::{describe_bindings, format_description, BindingDescription};
