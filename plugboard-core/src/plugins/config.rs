//! Host configuration - which plugins are disabled and per-plugin settings

use plugboard_api::{PluginConfig, WireShape};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::error::PluginHostError;

/// Host-side plugin configuration
///
/// Stored as TOML in `~/.config/plugboard/plugins.toml`:
///
/// ```toml
/// disabled = ["products"]
/// wire_shape = "tuple"
///
/// [plugin.counter]
/// step = 2
/// ```
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Plugin ids that must not be registered
    #[serde(default)]
    pub disabled: BTreeSet<String>,

    /// Message shape handed to the host dispatch hook
    #[serde(default)]
    pub wire_shape: WireShape,

    /// Per-plugin configuration tables
    #[serde(default, rename = "plugin")]
    pub plugins: BTreeMap<String, toml::Table>,
}

impl HostConfig {
    /// Default config location
    pub fn default_path() -> PathBuf {
        plugboard_paths::host_config_path()
    }

    /// Load config from a TOML file
    ///
    /// Returns the default config if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, PluginHostError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PluginHostError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), PluginHostError> {
        let content = toml::to_string_pretty(self).map_err(|e| PluginHostError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check if a plugin is disabled
    pub fn is_disabled(&self, id: &str) -> bool {
        self.disabled.contains(id)
    }

    /// Disable a plugin
    pub fn disable(&mut self, id: &str) {
        self.disabled.insert(id.to_string());
    }

    /// Re-enable a plugin
    pub fn enable(&mut self, id: &str) {
        self.disabled.remove(id);
    }

    /// Configuration handed to a plugin's `init`
    pub fn plugin_config(&self, id: &str) -> PluginConfig {
        self.plugins
            .get(id)
            .cloned()
            .map(PluginConfig::from_table)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default_is_empty() {
        let config = HostConfig::default();
        assert!(config.disabled.is_empty());
        assert_eq!(config.wire_shape, WireShape::Tuple);
        assert!(config.plugin_config("counter").is_empty());
    }

    #[test]
    fn test_config_enable_disable() {
        let mut config = HostConfig::default();

        config.disable("products");
        assert!(config.is_disabled("products"));
        assert!(!config.is_disabled("slider"));

        config.enable("products");
        assert!(!config.is_disabled("products"));
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = HostConfig::load(Path::new("/nonexistent/path/plugins.toml")).unwrap();
        assert!(config.disabled.is_empty());
    }

    #[test]
    fn test_config_parses_plugin_tables() {
        let toml_str = r#"
disabled = ["products"]
wire_shape = "object"

[plugin.counter]
step = 2
"#;
        let config: HostConfig = toml::from_str(toml_str).unwrap();

        assert!(config.is_disabled("products"));
        assert_eq!(config.wire_shape, WireShape::Object);
        assert_eq!(config.plugin_config("counter").get::<i64>("step"), Some(2));
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/plugins.toml");

        let mut config = HostConfig::default();
        config.disable("notes");
        let mut table = toml::Table::new();
        table.insert("max".to_string(), toml::Value::Integer(100));
        config.plugins.insert("slider".to_string(), table);
        config.save(&path).unwrap();

        let loaded = HostConfig::load(&path).unwrap();
        assert!(loaded.is_disabled("notes"));
        assert_eq!(loaded.plugin_config("slider").get::<i64>("max"), Some(100));
    }

    #[test]
    fn test_config_invalid_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugins.toml");
        std::fs::write(&path, "disabled = 5").unwrap();

        let err = HostConfig::load(&path).unwrap_err();
        assert!(matches!(err, PluginHostError::Config { .. }));
    }
}
