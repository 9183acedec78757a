//! Error conversion helpers for scene file operations
//!
//! Provides extension traits for cleaner error handling with path context.

use std::fmt::Display;
use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&scene)
    ///     .with_path_context("read scene", &scene)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait for turning parse/serialize failures into `SceneFormat` errors.
pub trait SceneFormatExt<T> {
    fn scene_format(self, path: &Path) -> ApplicationResult<T>;
}

impl<T, E: Display> SceneFormatExt<T> for Result<T, E> {
    fn scene_format(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::SceneFormat {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
