//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests use temp directories for the local layer; a global config in
//! the developer's XDG directory would form the baseline instead of defaults.

use std::fs;

use tempfile::TempDir;

use json2dom::config::{local_config_path, Settings};

#[test]
fn given_local_config_when_load_then_scalars_replace_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".json2dom.toml"),
        "indent = 4\nstrict_properties = true\ncontainer_id = \"root\"\n",
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.indent, 4);
    assert!(settings.strict_properties);
    assert_eq!(settings.container_id, "root");
}

#[test]
fn given_local_handlers_when_load_then_union_without_negated() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "handlers = [\"save\", \"cancel\", \"!missing\"]\n",
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert!(settings.handlers.contains(&"save".to_string()));
    assert!(settings.handlers.contains(&"cancel".to_string()));
    assert!(!settings.handlers.iter().any(|h| h.starts_with('!')));
}

#[test]
fn given_directory_without_config_when_load_then_succeeds() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path()));

    assert!(settings.is_ok());
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "indent = \"wide\"\n").unwrap();

    // Act
    let err = Settings::load(Some(dir.path())).unwrap_err();

    // Assert
    assert!(err.to_string().starts_with("config error: parse"));
}

#[test]
fn given_template_when_parsed_then_is_valid_toml() {
    let template = Settings::template();

    let parsed: toml::Table = toml::from_str(&template).expect("template parses");

    assert!(parsed.is_empty(), "template keeps every setting commented out");
}
