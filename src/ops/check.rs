//! Model validation over a whole project.
//!
//! The `check` command binds every declared managed view type in the
//! settings file and reports the outcome per type in one pass.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::model::engine::StructBindingEngine;
use crate::settings::Settings;

/// Outcome of binding one declared view type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TypeOutcome {
    /// The type bound successfully.
    Bound {
        #[serde(rename = "type")]
        type_name: String,
        managed_properties: usize,
        method_bindings: usize,
    },
    /// The type failed validation; `report` is the aggregated text.
    Invalid {
        #[serde(rename = "type")]
        type_name: String,
        report: String,
    },
}

impl TypeOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, TypeOutcome::Bound { .. })
    }

    pub fn type_name(&self) -> &str {
        match self {
            TypeOutcome::Bound { type_name, .. } => type_name,
            TypeOutcome::Invalid { type_name, .. } => type_name,
        }
    }
}

/// Summary of a whole-project model check.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub root_project: String,
    pub outcomes: Vec<TypeOutcome>,
}

impl ModelReport {
    /// Whether every declared managed type bound successfully.
    pub fn all_valid(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_valid())
    }
}

/// Bind every declared managed view type and collect the outcomes.
///
/// Types are bound in parallel; the engine's result cache keeps the
/// computation at-most-once per type regardless.
pub fn check_models(settings: &Settings) -> Result<ModelReport> {
    let universe = Arc::new(
        settings
            .build_universe()
            .context("failed to build the model type universe")?,
    );
    let provider: Arc<dyn crate::model::schema::SchemaProvider> = Arc::clone(&universe) as _;
    let engine = StructBindingEngine::new(provider);

    let managed = universe.managed_types();
    debug!(types = managed.len(), "checking declared managed types");

    let outcomes: Vec<TypeOutcome> = managed
        .par_iter()
        .map(|&ty| match engine.bind(&[ty], None) {
            Ok(bindings) => TypeOutcome::Bound {
                type_name: ty.name().to_string(),
                managed_properties: bindings.managed_properties().len(),
                method_bindings: bindings.method_bindings().len(),
            },
            Err(err) => TypeOutcome::Invalid {
                type_name: ty.name().to_string(),
                report: err.to_string(),
            },
        })
        .collect();

    Ok(ModelReport {
        root_project: settings.root_project().to_string(),
        outcomes,
    })
}

/// Format a model report for terminal output.
pub fn format_report(report: &ModelReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Model check for `{}`\n", report.root_project));

    if report.outcomes.is_empty() {
        output.push_str("no managed types declared\n");
        return output;
    }

    for outcome in &report.outcomes {
        match outcome {
            TypeOutcome::Bound {
                type_name,
                managed_properties,
                method_bindings,
            } => {
                output.push_str(&format!(
                    "  ok {} ({} managed properties, {} method bindings)\n",
                    type_name, managed_properties, method_bindings
                ));
            }
            TypeOutcome::Invalid { type_name, report } => {
                output.push_str(&format!("  FAIL {}\n", type_name));
                for line in report.lines() {
                    output.push_str(&format!("    {}\n", line));
                }
            }
        }
    }

    let failed = report.outcomes.iter().filter(|o| !o.is_valid()).count();
    if failed == 0 {
        output.push_str(&format!("{} types ok\n", report.outcomes.len()));
    } else {
        output.push_str(&format!(
            "{} of {} types failed validation\n",
            failed,
            report.outcomes.len()
        ));
    }

    output
}
