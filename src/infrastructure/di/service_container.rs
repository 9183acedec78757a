//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::{BindingService, SceneService};
use crate::config::Settings;
use crate::domain::Scene;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    pub scenes: SceneService,
    pub bindings: BindingService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let scenes = SceneService::new(Arc::clone(&fs));
        let bindings = BindingService::new(settings.constraint_name.clone());

        Self {
            settings,
            fs,
            scenes,
            bindings,
        }
    }

    /// Load a scene, reporting a missing file distinctly from a malformed one.
    pub fn load_scene(&self, path: &Path) -> InfraResult<Scene> {
        if !self.fs.exists(path) {
            return Err(InfraError::SceneNotFound(path.to_path_buf()));
        }
        debug!("loading scene {}", path.display());
        Ok(self.scenes.load(path)?)
    }

    pub fn save_scene(&self, path: &Path, scene: &Scene) -> InfraResult<()> {
        Ok(self.scenes.save(path, scene)?)
    }
}
