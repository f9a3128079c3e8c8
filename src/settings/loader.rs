//! Settings discovery and loading.
//!
//! The loader layer mirrors the build bootstrap: a factory hands out a
//! plain loader for nested builds, and a composite-aware loader for the
//! top-level build which additionally registers included builds.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::settings::file::SettingsFile;
use crate::settings::{Settings, SettingsError};

/// Canonical settings file name.
pub const SETTINGS_NAME: &str = "gantry.toml";

/// Accepted alias.
pub const SETTINGS_ALIAS: &str = "Gantry.toml";

/// Locate the settings file by walking up from `start_dir`.
pub fn find_settings(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = Some(start_dir);
    while let Some(d) = dir {
        for name in [SETTINGS_NAME, SETTINGS_ALIAS] {
            let candidate = d.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        dir = d.parent();
    }
    None
}

/// Finds and loads a project's settings.
pub trait SettingsLoader: Send + Sync {
    fn find_and_load(&self, start_dir: &Path) -> Result<Settings, SettingsError>;
}

/// Loads the nearest settings file, with no composite handling.
#[derive(Debug, Default)]
pub struct DefaultSettingsLoader;

impl SettingsLoader for DefaultSettingsLoader {
    fn find_and_load(&self, start_dir: &Path) -> Result<Settings, SettingsError> {
        let path = find_settings(start_dir)
            .ok_or_else(|| SettingsError::NotFound(start_dir.to_path_buf()))?;
        debug!(path = %path.display(), "loading settings");

        let contents = std::fs::read_to_string(&path).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })?;
        let file = SettingsFile::parse(&contents).map_err(|source| SettingsError::Parse {
            path: path.clone(),
            source,
        })?;

        let root_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Ok(Settings::new(root_dir, file))
    }
}

/// Records the included builds discovered while loading settings.
#[derive(Debug, Default)]
pub struct IncludedBuildRegistry {
    builds: RwLock<Vec<PathBuf>>,
}

impl IncludedBuildRegistry {
    pub fn new() -> Self {
        IncludedBuildRegistry::default()
    }

    /// Register an included build root, ignoring duplicates.
    pub fn register(&self, path: PathBuf) {
        let mut builds = self.builds.write().unwrap();
        if !builds.contains(&path) {
            info!(path = %path.display(), "registered included build");
            builds.push(path);
        }
    }

    /// The registered build roots, in registration order.
    pub fn registered(&self) -> Vec<PathBuf> {
        self.builds.read().unwrap().clone()
    }
}

/// Wraps a loader and registers each included build after loading.
pub struct CompositeSettingsLoader<L> {
    inner: L,
    registry: Arc<IncludedBuildRegistry>,
}

impl<L: SettingsLoader> CompositeSettingsLoader<L> {
    pub fn new(inner: L, registry: Arc<IncludedBuildRegistry>) -> Self {
        CompositeSettingsLoader { inner, registry }
    }
}

impl<L: SettingsLoader> SettingsLoader for CompositeSettingsLoader<L> {
    fn find_and_load(&self, start_dir: &Path) -> Result<Settings, SettingsError> {
        let settings = self.inner.find_and_load(start_dir)?;
        for include in settings.includes() {
            self.registry.register(settings.root_dir().join(include));
        }
        Ok(settings)
    }
}

/// Hands out the right loader for a build's position in the composition.
pub struct SettingsLoaderFactory {
    registry: Arc<IncludedBuildRegistry>,
}

impl SettingsLoaderFactory {
    pub fn new() -> Self {
        SettingsLoaderFactory {
            registry: Arc::new(IncludedBuildRegistry::new()),
        }
    }

    /// The registry composite loaders report into.
    pub fn registry(&self) -> Arc<IncludedBuildRegistry> {
        Arc::clone(&self.registry)
    }

    /// The top-level build resolves included builds.
    pub fn for_top_level_build(&self) -> Box<dyn SettingsLoader> {
        Box::new(CompositeSettingsLoader::new(
            DefaultSettingsLoader,
            Arc::clone(&self.registry),
        ))
    }

    /// Nested builds load their own settings only.
    pub fn for_nested_build(&self) -> Box<dyn SettingsLoader> {
        Box::new(DefaultSettingsLoader)
    }
}

impl Default for SettingsLoaderFactory {
    fn default() -> Self {
        SettingsLoaderFactory::new()
    }
}
