//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/bonetree/bonetree.toml`
//! 3. Local config: `<scene_dir>/.bonetree.toml`
//! 4. Environment variables: `BONETREE_*` prefix
//!
//! Command line flags override all of these.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::TraversalMode;

/// Raw settings for intermediate parsing (every field optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub mode: Option<TraversalMode>,
    pub constraint_name: Option<String>,
    pub write_back: Option<bool>,
    pub scene: Option<PathBuf>,
}

/// Unified configuration for bonetree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Traversal mode used when `--mode` is not given
    pub mode: TraversalMode,
    /// Display name given to created copy-transforms constraints
    pub constraint_name: String,
    /// Save the scene back after apply/remove when no `--write`/`--output` is given
    pub write_back: bool,
    /// Scene file used when no scene argument is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: TraversalMode::ParentBased,
            constraint_name: "Copy Transforms".into(),
            write_back: false,
            scene: None,
        }
    }
}

/// Get the XDG config directory for bonetree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bonetree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("bonetree.toml"))
}

/// Get the path to the local config file next to the scene files.
pub fn local_config_path(scene_dir: &Path) -> PathBuf {
    scene_dir.join(".bonetree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; the input is returned unchanged if expansion fails.
fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(scene) = self.scene.take() {
            self.scene = Some(PathBuf::from(expand_env_vars(&scene.to_string_lossy())));
        }
    }

    /// Overlay config onto self: a field wins if the overlay specifies it.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            mode: overlay.mode.unwrap_or(self.mode),
            constraint_name: overlay
                .constraint_name
                .clone()
                .unwrap_or_else(|| self.constraint_name.clone()),
            write_back: overlay.write_back.unwrap_or(self.write_back),
            scene: overlay.scene.clone().or_else(|| self.scene.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `scene_dir` - Optional directory holding a local `.bonetree.toml`
    pub fn load(scene_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config
        if let Some(dir) = scene_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        // 4. Environment variables
        current = current.apply_env_overrides(bonetree_env())?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply `BONETREE_*` environment variables as explicit overrides.
    fn apply_env_overrides(mut self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("mode") {
            self.mode = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("constraint_name") {
            self.constraint_name = val;
        }
        if let Ok(val) = config.get_bool("write_back") {
            self.write_back = val;
        }
        if let Ok(val) = config.get_string("scene") {
            self.scene = Some(PathBuf::from(val));
        }
        Ok(self)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# bonetree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/bonetree/bonetree.toml
#   Local:  <scene_dir>/.bonetree.toml
#   Env:    BONETREE_* environment variables
# Command line flags override everything.

# Traversal mode: PARENT_BASED walks the parent armature from the root bone,
# CHILD_BASED walks every bone of each child armature (root bone ignored)
# mode = "PARENT_BASED"

# Name given to created Copy Transforms constraints
# constraint_name = "Copy Transforms"

# Save the scene file after apply/remove
# write_back = false

# Scene file used when none is given on the command line
# scene = "~/rigs/scene.toml"
"#
        .to_string()
    }
}

/// `BONETREE_*` variables; `__` separates nested keys.
fn bonetree_env() -> Environment {
    Environment::with_prefix("BONETREE")
        .prefix_separator("_")
        .separator("__")
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
