//! In-process host used by the CLI
//!
//! Stands in for the MVU application: accepts every plugin handed to it and
//! logs messages dispatched by plugin views.

use anyhow::{Context, Result};
use plugboard_core::{HostConfig, PluginDefinition, PluginHostError, PluginRegistry};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Registry with the reference plugins registered
pub struct Host {
    pub registry: PluginRegistry,
    /// Plugins that were not registered, with the reason
    pub skipped: Vec<(String, PluginHostError)>,
}

/// Load the host config from `path`, or from the default location
pub fn load_config(path: Option<&Path>) -> Result<HostConfig> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(HostConfig::default_path);
    HostConfig::load(&path).with_context(|| format!("loading host config {}", path.display()))
}

impl Host {
    pub fn new(config: HostConfig) -> Self {
        let mut registry =
            PluginRegistry::new(config).with_registrar(|definition: Arc<PluginDefinition>| {
                tracing::debug!(plugin = %definition.id(), "Host accepted plugin");
                true
            });
        registry.install_dispatch(|wire: Value| {
            tracing::info!(message = %wire, "Plugin dispatched message");
        });

        let mut skipped = Vec::new();
        for descriptor in plugboard_reference::descriptors() {
            let id = descriptor.id.clone();
            if let Err(e) = registry.register(descriptor) {
                tracing::warn!(plugin = %id, error = %e, "Plugin not registered");
                skipped.push((id, e));
            }
        }
        plugboard_reference::register_messages(registry.messages_mut());

        Self { registry, skipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_host_registers_reference_plugins() {
        let host = Host::new(HostConfig::default());
        assert!(host.skipped.is_empty());
        assert!(host.registry.is_registered("counter"));
        assert!(host.registry.is_registered("slider"));
    }

    #[test]
    fn test_disabled_plugin_is_skipped() {
        let mut config = HostConfig::default();
        config.disable("slider");
        let host = Host::new(config);

        assert!(!host.registry.is_registered("slider"));
        assert_eq!(host.skipped.len(), 1);
        assert!(matches!(host.skipped[0].1, PluginHostError::Disabled { .. }));
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugins.toml");
        std::fs::write(&path, "disabled = [\"counter\"]\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(config.is_disabled("counter"));
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugins.toml");
        std::fs::write(&path, "disabled = not-a-list").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("plugins.toml"));
    }
}
