//! Binding breakdown for a single view type.
//!
//! The `describe` command shows how each method of one declared type
//! resolves: managed storage, direct view implementation, or delegation.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::sync::Arc;

use crate::model::bindings::MethodBinding;
use crate::model::engine::StructBindingEngine;
use crate::settings::Settings;

/// One resolved method row.
#[derive(Debug, Clone, Serialize)]
pub struct MethodRow {
    pub signature: String,
    pub strategy: &'static str,
    /// The type declaring the bound view method.
    pub declared_by: String,
}

/// One managed property row.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyRow {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub writable: bool,
}

/// A rendered binding breakdown for one view type.
#[derive(Debug, Clone, Serialize)]
pub struct BindingDescription {
    #[serde(rename = "type")]
    pub type_name: String,
    pub delegate: Option<String>,
    pub declared_views: Vec<String>,
    pub managed_properties: Vec<PropertyRow>,
    pub methods: Vec<MethodRow>,
}

/// Bind one declared type (optionally with a delegate) and describe it.
pub fn describe_bindings(
    settings: &Settings,
    type_name: &str,
    delegate_name: Option<&str>,
) -> Result<BindingDescription> {
    let universe = Arc::new(
        settings
            .build_universe()
            .context("failed to build the model type universe")?,
    );

    let ty = universe
        .get(type_name)
        .ok_or_else(|| anyhow!("type `{}` is not declared in the settings file", type_name))?;
    let delegate = delegate_name
        .map(|name| {
            universe
                .get(name)
                .ok_or_else(|| anyhow!("type `{}` is not declared in the settings file", name))
        })
        .transpose()?;

    let provider: Arc<dyn crate::model::schema::SchemaProvider> = Arc::clone(&universe) as _;
    let engine = StructBindingEngine::new(provider);
    let bindings = engine.bind(&[ty], delegate)?;

    Ok(BindingDescription {
        type_name: type_name.to_string(),
        delegate: delegate_name.map(str::to_string),
        declared_views: bindings
            .declared_views()
            .iter()
            .map(|s| s.ty().name().to_string())
            .collect(),
        managed_properties: bindings
            .managed_properties()
            .iter()
            .map(|p| PropertyRow {
                name: p.name.to_string(),
                value_type: p.value_type.to_string(),
                writable: p.writable,
            })
            .collect(),
        methods: bindings
            .method_bindings()
            .iter()
            .map(|b| {
                let declared_by = match b {
                    MethodBinding::Managed(m) => m.method.declared_by,
                    MethodBinding::Direct(d) => d.method.declared_by,
                    MethodBinding::Delegate(d) => d.method.declared_by,
                };
                MethodRow {
                    signature: b.signature().to_string(),
                    strategy: b.strategy(),
                    declared_by: declared_by.to_string(),
                }
            })
            .collect(),
    })
}

/// Format a binding description for terminal output.
pub fn format_description(desc: &BindingDescription) -> String {
    let mut output = String::new();

    output.push_str(&format!("Bindings for `{}`", desc.type_name));
    if let Some(delegate) = &desc.delegate {
        output.push_str(&format!(" (delegate `{}`)", delegate));
    }
    output.push('\n');

    if !desc.managed_properties.is_empty() {
        output.push_str("managed properties:\n");
        for p in &desc.managed_properties {
            let access = if p.writable { "read-write" } else { "read-only" };
            output.push_str(&format!("  {}: {} ({})\n", p.name, p.value_type, access));
        }
    }

    output.push_str("methods:\n");
    for m in &desc.methods {
        output.push_str(&format!(
            "  {} [{}] (declared by {})\n",
            m.signature, m.strategy, m.declared_by
        ));
    }

    output
}
