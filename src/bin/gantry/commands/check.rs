//! `gantry check` command

use std::path::PathBuf;

use anyhow::{Context, Result};

use gantry::ops::{check_models, format_report};
use gantry::settings::SettingsLoaderFactory;

use crate::cli::{CheckArgs, OutputFormat};

pub fn execute(args: CheckArgs) -> Result<()> {
    let start_dir = match args.path {
        Some(path) => path,
        None => std::env::current_dir().context("failed to determine current directory")?,
    };

    let factory = SettingsLoaderFactory::new();
    let loader = if args.nested {
        factory.for_nested_build()
    } else {
        factory.for_top_level_build()
    };
    let settings = loader.find_and_load(&start_dir)?;

    let report = check_models(&settings)?;

    match args.format {
        OutputFormat::Text => {
            print!("{}", format_report(&report));
            print_included_builds(&factory);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if !report.all_valid() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_included_builds(factory: &SettingsLoaderFactory) {
    let included: Vec<PathBuf> = factory.registry().registered();
    if !included.is_empty() {
        println!("included builds:");
        for path in included {
            println!("  {}", path.display());
        }
    }
}
