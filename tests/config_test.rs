//! Integration tests for Settings loading from a local `.bonetree.toml`.
//!
//! These run without a global config (temp directories only), so the local file layers
//! directly over compiled defaults.

use std::fs;

use tempfile::TempDir;

use bonetree::config::{local_config_path, Settings};
use bonetree::domain::TraversalMode;

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
mode = "CHILD_BASED"
write_back = true
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.mode, TraversalMode::ChildBased);
    assert!(settings.write_back);
    assert_eq!(settings.constraint_name, "Copy Transforms");
}

#[test]
fn given_no_local_config_when_load_then_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.mode, TraversalMode::ParentBased);
    assert!(!settings.write_back);
}

#[test]
fn given_invalid_local_config_when_load_then_config_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "mode = \"SIDEWAYS\"\n").unwrap();

    // Act
    let result = Settings::load(Some(dir.path()));

    // Assert
    assert!(result.is_err());
}

#[test]
fn given_template_written_as_local_config_when_load_then_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), Settings::template()).unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings, Settings::default());
}
