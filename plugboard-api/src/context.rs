//! InitContext - what a plugin sees when its `init` function runs

use crate::bridge::DispatchBridge;
use crate::model::StateScope;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Context passed to a plugin's `init` function, once, right after the host
/// accepted the plugin.
///
/// Provides:
/// - A dispatch handle (may not be connected to the host yet)
/// - The plugin's configuration table from the host config
/// - Its state scope
/// - Logging helpers prefixed with the plugin id
pub struct InitContext {
    plugin_id: String,
    dispatch: DispatchBridge,
    config: PluginConfig,
    state: StateScope,
}

/// Read-only view of a plugin's `[plugin.<id>]` table from the host config
#[derive(Debug, Clone, Default)]
pub struct PluginConfig {
    values: toml::Table,
}

impl InitContext {
    /// Create a new init context
    pub fn new(plugin_id: String, dispatch: DispatchBridge, config: PluginConfig) -> Self {
        let state = StateScope::new(plugin_id.clone());
        Self {
            plugin_id,
            dispatch,
            config,
            state,
        }
    }

    /// Get the plugin's id
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// Dispatch handle shared with the host
    pub fn bridge(&self) -> &DispatchBridge {
        &self.dispatch
    }

    /// Dispatch a message. Returns `false` if the host is not ready yet.
    pub fn dispatch(&self, kind: &str, payload: Value) -> bool {
        self.dispatch.dispatch(kind, payload)
    }

    /// This plugin's state scope
    pub fn state(&self) -> &StateScope {
        &self.state
    }

    // ─── Configuration ───────────────────────────────────────────────

    /// Read a configuration value
    ///
    /// # Example
    /// ```ignore
    /// let step: i64 = ctx.config_get("step").unwrap_or(1);
    /// ```
    pub fn config_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config.get(key)
    }

    /// Borrow the whole configuration
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    // ─── Logging ─────────────────────────────────────────────────────

    /// Log an info message (automatically prefixed with plugin id)
    pub fn log_info(&self, message: &str) {
        tracing::info!(plugin = %self.plugin_id, "{}", message);
    }

    /// Log a warning message
    pub fn log_warn(&self, message: &str) {
        tracing::warn!(plugin = %self.plugin_id, "{}", message);
    }

    /// Log an error message
    pub fn log_error(&self, message: &str) {
        tracing::error!(plugin = %self.plugin_id, "{}", message);
    }

    /// Log a debug message
    pub fn log_debug(&self, message: &str) {
        tracing::debug!(plugin = %self.plugin_id, "{}", message);
    }
}

impl PluginConfig {
    /// Create a new empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from an already-parsed TOML table
    pub fn from_table(values: toml::Table) -> Self {
        Self { values }
    }

    /// Get a configuration value, `None` if missing or of another type
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values.get(key).and_then(|v| v.clone().try_into().ok())
    }

    /// Whether the config has no keys
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
