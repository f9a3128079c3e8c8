//! `gantry describe` command

use anyhow::{Context, Result};

use gantry::ops::{describe_bindings, format_description};
use gantry::settings::SettingsLoaderFactory;

use crate::cli::{DescribeArgs, OutputFormat};

pub fn execute(args: DescribeArgs) -> Result<()> {
    let start_dir = match args.path {
        Some(path) => path,
        None => std::env::current_dir().context("failed to determine current directory")?,
    };

    let loader = SettingsLoaderFactory::new().for_nested_build();
    let settings = loader.find_and_load(&start_dir)?;

    let description = describe_bindings(&settings, &args.type_name, args.delegate.as_deref())?;

    match args.format {
        OutputFormat::Text => print!("{}", format_description(&description)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&description)?),
    }

    Ok(())
}
