//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/json2dom/json2dom.toml`
//! 3. Local config: `<input_dir>/.json2dom.toml` (next to the description file)
//! 4. Environment variables: `JSON2DOM_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::builder::DEFAULT_MAX_DEPTH;
use crate::domain::{DocumentOptions, RenderOptions};

/// Unified configuration for json2dom.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Maximum nesting depth of a description
    pub max_depth: usize,
    /// Reject tags that are not known HTML elements
    pub strict_tags: bool,
    /// Reject property names unknown to the element kind
    pub strict_properties: bool,
    /// Spaces per level in HTML output, 0 for single-line output
    pub indent: usize,
    /// Element id that `--mount` targets by default
    pub container_id: String,
    /// Handler names descriptions may reference with `{"$handler": "name"}`
    pub handlers: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_tags: false,
            strict_properties: false,
            indent: 2,
            container_id: "app".into(),
            handlers: vec![],
        }
    }
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub max_depth: Option<usize>,
    pub strict_tags: Option<bool>,
    pub strict_properties: Option<bool>,
    pub indent: Option<usize>,
    pub container_id: Option<String>,
    pub handlers: Option<Vec<String>>,
}

/// Get the XDG config directory for json2dom.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "json2dom").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("json2dom.toml"))
}

/// Get the path to the local config file in an input directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".json2dom.toml")
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

impl Settings {
    /// Merge handler lists with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(pattern.clone());
            }
        }

        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Merge local config onto self: scalars replace, handlers union.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            handlers: overlay
                .handlers
                .as_ref()
                .map(|o| Self::merge_array(&self.handlers, o))
                .unwrap_or_else(|| self.handlers.clone()),
            ..self.apply_scalars(overlay)
        }
    }

    /// Apply global config onto defaults: everything specified replaces.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            handlers: global
                .handlers
                .clone()
                .unwrap_or_else(|| self.handlers.clone()),
            ..self.apply_scalars(global)
        }
    }

    fn apply_scalars(&self, raw: &RawSettings) -> Self {
        Self {
            max_depth: raw.max_depth.unwrap_or(self.max_depth),
            strict_tags: raw.strict_tags.unwrap_or(self.strict_tags),
            strict_properties: raw.strict_properties.unwrap_or(self.strict_properties),
            indent: raw.indent.unwrap_or(self.indent),
            container_id: raw
                .container_id
                .clone()
                .unwrap_or_else(|| self.container_id.clone()),
            handlers: self.handlers.clone(),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `input_dir` - Directory of the description file, searched for `.json2dom.toml`
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with negation support
    /// - Any → Env vars: REPLACE
    pub fn load(input_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config: {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = input_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config: {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply JSON2DOM_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("JSON2DOM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("max_depth") {
            settings.max_depth = parse_env("max_depth", &val)?;
        }
        if let Ok(val) = config.get_string("strict_tags") {
            settings.strict_tags = parse_env("strict_tags", &val)?;
        }
        if let Ok(val) = config.get_string("strict_properties") {
            settings.strict_properties = parse_env("strict_properties", &val)?;
        }
        if let Ok(val) = config.get_string("indent") {
            settings.indent = parse_env("indent", &val)?;
        }
        if let Ok(val) = config.get_string("container_id") {
            settings.container_id = val;
        }
        if let Ok(val) = config.get_string("handlers") {
            settings.handlers = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(settings)
    }

    /// Options for documents built under these settings.
    pub fn document_options(&self) -> DocumentOptions {
        DocumentOptions {
            strict_tags: self.strict_tags,
            strict_properties: self.strict_properties,
        }
    }

    /// Options for HTML output under these settings.
    pub fn render_options(&self) -> RenderOptions {
        match self.indent {
            0 => RenderOptions::compact(),
            width => RenderOptions::indented(width),
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# json2dom configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/json2dom/json2dom.toml
#   Local:  <input_dir>/.json2dom.toml      (next to the description file)
#   Env:    JSON2DOM_* environment variables (e.g. JSON2DOM_MAX_DEPTH=64)
#
# Local `handlers` UNION with global ones; use "!name" to remove an inherited one.

# Maximum nesting depth of a description
# max_depth = 256

# Reject tags that are not known HTML elements
# strict_tags = false

# Reject property names the element kind does not know
# strict_properties = false

# Spaces per level in HTML output (0 = single line)
# indent = 2

# Element id targeted by `render --mount` when no id is given
# container_id = "app"

# Handler names usable as {"$handler": "name"} in descriptions
# handlers = ["save", "cancel"]
"#
        .to_string()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ApplicationError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| ApplicationError::Config {
        message: format!("JSON2DOM_{}={value}: {e}", key.to_ascii_uppercase()),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_have_expected_values() {
        let settings = Settings::default();
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(settings.indent, 2);
        assert_eq!(settings.container_id, "app");
        assert!(settings.handlers.is_empty());
    }

    #[test]
    fn test_merge_array_union() {
        let base = vec!["a".to_string(), "b".to_string()];
        let overlay = vec!["c".to_string()];
        assert_eq!(Settings::merge_array(&base, &overlay), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_array_negation() {
        let base = vec!["a".to_string(), "b".to_string()];
        let overlay = vec!["!a".to_string(), "c".to_string()];
        assert_eq!(Settings::merge_array(&base, &overlay), vec!["b", "c"]);
    }

    #[test]
    fn test_apply_global_replaces_handlers() {
        let base = Settings {
            handlers: vec!["a".into()],
            ..Default::default()
        };
        let raw = RawSettings {
            handlers: Some(vec!["b".into()]),
            indent: Some(4),
            ..Default::default()
        };
        let result = base.apply_global(&raw);
        assert_eq!(result.handlers, vec!["b"]);
        assert_eq!(result.indent, 4);
        assert_eq!(result.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_merge_with_unions_handlers() {
        let base = Settings {
            handlers: vec!["a".into()],
            ..Default::default()
        };
        let raw = RawSettings {
            handlers: Some(vec!["b".into()]),
            strict_tags: Some(true),
            ..Default::default()
        };
        let result = base.merge_with(&raw);
        assert_eq!(result.handlers, vec!["a", "b"]);
        assert!(result.strict_tags);
    }

    #[test]
    fn test_render_options_from_indent() {
        let mut settings = Settings::default();
        assert_eq!(settings.render_options(), RenderOptions::indented(2));
        settings.indent = 0;
        assert_eq!(settings.render_options(), RenderOptions::compact());
    }

    #[test]
    fn test_to_toml_round_trips_through_raw_settings() {
        let settings = Settings {
            handlers: vec!["save".into()],
            ..Default::default()
        };
        let text = settings.to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(raw.handlers, Some(vec!["save".to_string()]));
        assert_eq!(raw.container_id.as_deref(), Some("app"));
    }
}
