//! Project settings - which projects participate in a build, how
//! composite builds relate, and the declared model type universe.

pub mod file;
pub mod loader;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::universe::{DeclareError, TypeUniverse};
use crate::settings::file::SettingsFile;

pub use loader::{
    find_settings, CompositeSettingsLoader, DefaultSettingsLoader, IncludedBuildRegistry,
    SettingsLoader, SettingsLoaderFactory, SETTINGS_ALIAS, SETTINGS_NAME,
};

/// Error while locating, parsing, or interpreting settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no settings file found starting from `{0}`")]
    NotFound(PathBuf),

    #[error("failed to read settings file `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file `{path}`")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown type `{0}` referenced in model declarations")]
    UnknownType(String),

    #[error("malformed type string `{0}`")]
    MalformedType(String),

    #[error(transparent)]
    Declare(#[from] DeclareError),
}

/// A project's loaded settings.
#[derive(Debug, Clone)]
pub struct Settings {
    root_dir: PathBuf,
    file: SettingsFile,
}

impl Settings {
    pub(crate) fn new(root_dir: PathBuf, file: SettingsFile) -> Self {
        Settings { root_dir, file }
    }

    /// The root project name.
    pub fn root_project(&self) -> &str {
        &self.file.settings.root
    }

    /// Sub-project names participating in the build.
    pub fn projects(&self) -> &[String] {
        &self.file.settings.projects
    }

    /// Included build paths as declared (relative to the settings file).
    pub fn includes(&self) -> &[PathBuf] {
        &self.file.settings.includes
    }

    /// The directory containing the settings file.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Number of declared model types.
    pub fn declared_type_count(&self) -> usize {
        self.file.types.len()
    }

    /// Populate a fresh type universe from the declared model types.
    pub fn build_universe(&self) -> Result<TypeUniverse, SettingsError> {
        self.file.build_universe()
    }
}
