//! The managed model core.
//!
//! This module contains the struct binding engine and its collaborators:
//! - Nominal types and value types (ModelType, ValueType)
//! - The declarative type universe backing the schema provider
//! - Accessor classification and convergence reduction
//! - The binding engine, its result values, and diagnostics

pub mod accessor;
pub mod bindings;
pub mod convergence;
pub mod diagnostics;
pub mod engine;
pub mod schema;
pub mod types;
pub mod universe;

pub use accessor::{AccessorKind, Classification};
pub use bindings::{ManagedProperty, MethodBinding, StructBindings};
pub use convergence::find_converging_types;
pub use diagnostics::{InvalidManagedType, Problem, ProblemCollector};
pub use engine::StructBindingEngine;
pub use schema::{MethodDecl, MethodSignature, SchemaProvider, TypeSchema, Visibility};
pub use types::{ModelType, Scalar, TypeKind, ValueType};
pub use universe::{DeclareError, MethodSpec, TypeDecl, TypeUniverse};
