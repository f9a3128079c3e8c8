//! Gantry - settings and managed-model layer for the Gantry build system
//!
//! This crate provides the configuration model core for Gantry,
//! including settings loading, the declarative type universe, and the
//! struct binding engine that resolves managed model types.

pub mod model;
pub mod ops;
pub mod settings;
pub mod util;

pub use model::bindings::{MethodBinding, StructBindings};
pub use model::diagnostics::InvalidManagedType;
pub use model::engine::StructBindingEngine;
pub use model::schema::{SchemaProvider, TypeSchema};
pub use model::types::{ModelType, TypeKind, ValueType};
pub use model::universe::TypeUniverse;
pub use settings::{Settings, SettingsLoaderFactory};
pub use util::Name;
