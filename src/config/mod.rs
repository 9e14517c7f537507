//! Configuration management for the privacy monitor
//!
//! Handles loading, parsing, and hot-reloading of the YAML configuration file.
//! Parsing is lenient: a malformed value falls back to its default instead of
//! rejecting the whole file, so a typo never takes the indicators down.

pub mod watcher;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::nodes::NodeCategory;

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PrivacyConfig {
    /// Spacing between indicator icons (pixels; the status line uses one
    /// space per unit)
    pub icon_spacing: u32,
    /// Indicator icon size (pixels, cosmetic)
    pub icon_size: u32,
    /// Delay before hiding the container once nothing is in use (milliseconds)
    pub transition_duration: u64,
    /// Indicator modules, in display order
    pub modules: Vec<ModuleConfig>,
}

/// One indicator module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleConfig {
    #[serde(rename = "type", serialize_with = "serialize_module_type")]
    pub category: NodeCategory,
    /// Whether the indicator shows per-node detail rows in its tooltip
    pub tooltip: bool,
    pub tooltip_icon_size: u32,
}

impl ModuleConfig {
    pub fn new(category: NodeCategory) -> Self {
        Self {
            category,
            tooltip: true,
            tooltip_icon_size: default_tooltip_icon_size(),
        }
    }
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            icon_spacing: default_icon_spacing(),
            icon_size: default_icon_size(),
            transition_duration: default_transition_duration(),
            modules: default_modules(),
        }
    }
}

impl PrivacyConfig {
    /// Load configuration from file
    ///
    /// A missing file yields the defaults. Unreadable files and YAML syntax
    /// errors are reported; bad individual values are not.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !fs::try_exists(path).await.unwrap_or(false) {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(contents)?;
        Ok(Self::from_value(&value))
    }

    /// Build a configuration from an already-parsed YAML document
    ///
    /// Never fails: anything unusable is replaced by its default.
    pub fn from_value(value: &Value) -> Self {
        let map = match value {
            Value::Mapping(map) => map,
            Value::Null => return Self::default(),
            other => {
                warn!("Config root is not a mapping ({:?}), using defaults", other);
                return Self::default();
            }
        };

        let config = Self {
            icon_spacing: lookup_u32(map, "icon-spacing").unwrap_or_else(default_icon_spacing),
            icon_size: lookup_u32(map, "icon-size").unwrap_or_else(default_icon_size),
            transition_duration: lookup(map, "transition-duration")
                .and_then(Value::as_u64)
                .unwrap_or_else(default_transition_duration),
            modules: parse_modules(lookup(map, "modules")),
        };

        debug!(?config, "Configuration parsed");
        config
    }

    /// Categories with an indicator, in module order, without duplicates
    ///
    /// Only these categories contribute to container visibility.
    pub fn tracked_categories(&self) -> Vec<NodeCategory> {
        let mut tracked = Vec::with_capacity(self.modules.len());
        for module in &self.modules {
            if !tracked.contains(&module.category) {
                tracked.push(module.category);
            }
        }
        tracked
    }

    /// Render the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }
}

/// Find a key in either `kebab-case` or `snake_case` spelling
fn lookup<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key)
        .or_else(|| map.get(key.replace('-', "_").as_str()))
}

fn lookup_u32(map: &Mapping, key: &str) -> Option<u32> {
    let value = lookup(map, key)?;
    match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
        Some(v) => Some(v),
        None => {
            warn!("Ignoring invalid '{}' value {:?}", key, value);
            None
        }
    }
}

fn parse_modules(value: Option<&Value>) -> Vec<ModuleConfig> {
    let entries = match value {
        Some(Value::Sequence(entries)) if !entries.is_empty() => entries,
        _ => return default_modules(),
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let map = entry.as_mapping()?;
            let type_name = map.get("type").and_then(Value::as_str)?;
            let Some(category) = NodeCategory::from_module_type(type_name) else {
                warn!("Skipping module {} with unknown type '{}'", idx, type_name);
                return None;
            };

            Some(ModuleConfig {
                category,
                tooltip: map.get("tooltip").and_then(Value::as_bool).unwrap_or(true),
                tooltip_icon_size: lookup_u32(map, "tooltip-icon-size")
                    .unwrap_or_else(default_tooltip_icon_size),
            })
        })
        .collect()
}

fn serialize_module_type<S>(category: &NodeCategory, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(category.module_type())
}

// Default value functions
fn default_icon_spacing() -> u32 { 0 }
fn default_icon_size() -> u32 { 20 }
fn default_transition_duration() -> u64 { 0 }
fn default_tooltip_icon_size() -> u32 { 24 }
fn default_modules() -> Vec<ModuleConfig> {
    vec![
        ModuleConfig::new(NodeCategory::VideoInput),
        ModuleConfig::new(NodeCategory::AudioInput),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = PrivacyConfig::from_yaml_str("").unwrap();
        assert_eq!(config, PrivacyConfig::default());
        assert_eq!(
            config.tracked_categories(),
            vec![NodeCategory::VideoInput, NodeCategory::AudioInput]
        );
    }

    #[test]
    fn test_full_config() {
        let config = PrivacyConfig::from_yaml_str(
            r#"
icon-spacing: 4
icon-size: 18
transition-duration: 250
modules:
  - type: audio-out
    tooltip: false
  - type: screenshare
    tooltip-icon-size: 32
"#,
        )
        .unwrap();

        assert_eq!(config.icon_spacing, 4);
        assert_eq!(config.icon_size, 18);
        assert_eq!(config.transition_duration, 250);
        assert_eq!(
            config.tracked_categories(),
            vec![NodeCategory::AudioOutput, NodeCategory::VideoInput]
        );
        assert!(!config.modules[0].tooltip);
        assert_eq!(config.modules[1].tooltip_icon_size, 32);
    }

    #[test]
    fn test_snake_case_keys_accepted() {
        let config =
            PrivacyConfig::from_yaml_str("icon_spacing: 2\ntransition_duration: 100\n").unwrap();
        assert_eq!(config.icon_spacing, 2);
        assert_eq!(config.transition_duration, 100);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config = PrivacyConfig::from_yaml_str(
            r#"
icon-spacing: -3
icon-size: "big"
transition-duration: 1.5
"#,
        )
        .unwrap();

        assert_eq!(config.icon_spacing, 0);
        assert_eq!(config.icon_size, 20);
        assert_eq!(config.transition_duration, 0);
    }

    #[test]
    fn test_empty_or_missing_modules_use_default_selection() {
        for yaml in ["modules: []", "modules: screenshare", "icon-size: 10"] {
            let config = PrivacyConfig::from_yaml_str(yaml).unwrap();
            assert_eq!(
                config.tracked_categories(),
                vec![NodeCategory::VideoInput, NodeCategory::AudioInput],
                "for {:?}",
                yaml
            );
        }
    }

    #[test]
    fn test_invalid_module_entries_skipped() {
        let config = PrivacyConfig::from_yaml_str(
            r#"
modules:
  - audio-in
  - type: 5
  - type: webcam
  - type: audio-in
  - type: audio-in
"#,
        )
        .unwrap();

        assert_eq!(config.modules.len(), 2);
        assert_eq!(config.tracked_categories(), vec![NodeCategory::AudioInput]);
    }

    #[test]
    fn test_non_mapping_root_uses_defaults() {
        let config = PrivacyConfig::from_yaml_str("- a\n- b\n").unwrap();
        assert_eq!(config, PrivacyConfig::default());
    }

    #[test]
    fn test_syntax_error_is_reported() {
        assert!(PrivacyConfig::from_yaml_str("modules: [").is_err());
    }

    #[test]
    fn test_yaml_dump_reloads_to_same_config() {
        let config = PrivacyConfig::from_yaml_str(
            "icon-size: 16\ntransition-duration: 300\nmodules:\n  - type: audio-out\n    tooltip: false\n",
        )
        .unwrap();

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("type: audio-out"));
        assert!(yaml.contains("transition-duration: 300"));
        assert_eq!(PrivacyConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = PrivacyConfig::load(temp_dir.path().join("absent.yaml")).await?;
        assert_eq!(config, PrivacyConfig::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_from_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "transition-duration: 500\n")?;

        let config = PrivacyConfig::load(&path).await?;
        assert_eq!(config.transition_duration, 500);
        Ok(())
    }
}
