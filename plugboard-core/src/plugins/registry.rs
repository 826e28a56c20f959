//! PluginRegistry - registration, message routing and view rendering

use plugboard_api::{
    API_VERSION, DispatchBridge, HandlerError, HostDispatch, InitContext, Markup, Message,
    MessageTable, Model, PluginDescriptor,
};
use serde_json::Value;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::config::HostConfig;
use super::definition::PluginDefinition;
use super::error::PluginHostError;
use super::views::{RegisteredTab, ViewRegistry};

/// Host-side registration entry point.
///
/// Called exactly once per newly registered plugin id. Returning `false`
/// rejects the plugin.
pub trait HostRegistrar: Send + Sync {
    fn register_plugin(&self, definition: Arc<PluginDefinition>) -> bool;
}

impl<F> HostRegistrar for F
where
    F: Fn(Arc<PluginDefinition>) -> bool + Send + Sync,
{
    fn register_plugin(&self, definition: Arc<PluginDefinition>) -> bool {
        self(definition)
    }
}

/// A plugin whose update failed while routing a message
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerFailure {
    pub plugin_id: String,
    pub kind: String,
    pub error: HandlerError,
}

/// Result of routing one message through every interested plugin
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    /// Model after all successful updates
    pub model: Model,
    /// Plugins whose update ran successfully, in order
    pub handled_by: Vec<String>,
    /// Plugins whose update failed; their step kept the prior model
    pub failures: Vec<HandlerFailure>,
}

/// Registry of plugins owned by one host application instance.
///
/// The host creates it at startup and hands it to plugin-loading code;
/// there is no global registry.
pub struct PluginRegistry {
    config: HostConfig,
    registrar: Option<Arc<dyn HostRegistrar>>,
    bridge: DispatchBridge,
    /// Registered plugins by id
    plugins: HashMap<String, Arc<PluginDefinition>>,
    /// Registration order, used for message routing
    order: Vec<String>,
    views: ViewRegistry,
    messages: MessageTable,
}

impl PluginRegistry {
    /// Create a registry with no host hooks installed
    pub fn new(config: HostConfig) -> Self {
        let bridge = DispatchBridge::new(config.wire_shape);
        Self {
            config,
            registrar: None,
            bridge,
            plugins: HashMap::new(),
            order: Vec::new(),
            views: ViewRegistry::new(),
            messages: MessageTable::new(),
        }
    }

    /// Builder: install the host registration hook
    pub fn with_registrar(mut self, registrar: impl HostRegistrar + 'static) -> Self {
        self.set_registrar(registrar);
        self
    }

    /// Install (or replace) the host registration hook
    pub fn set_registrar(&mut self, registrar: impl HostRegistrar + 'static) {
        self.registrar = Some(Arc::new(registrar));
    }

    /// Install the host dispatch hook on the bridge
    pub fn install_dispatch(&self, hook: impl HostDispatch + 'static) {
        self.bridge.install(hook);
    }

    /// Dispatch handle shared by all plugins
    pub fn bridge(&self) -> &DispatchBridge {
        &self.bridge
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn messages(&self) -> &MessageTable {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageTable {
        &mut self.messages
    }

    // ─── Registration ───────────────────────────────────────────────

    /// Register a plugin.
    ///
    /// Registering an id twice returns the existing definition without
    /// calling the host hook or `init` again. On success the plugin's `init`
    /// runs once; its failure is logged, not returned.
    pub fn register(
        &mut self,
        descriptor: PluginDescriptor,
    ) -> Result<Arc<PluginDefinition>, PluginHostError> {
        let id = descriptor.id.clone();

        if id.trim().is_empty() {
            tracing::error!("Refusing to register plugin with empty id");
            return Err(PluginHostError::InvalidDescriptor(
                "plugin id must not be empty".to_string(),
            ));
        }

        if let Some(existing) = self.plugins.get(&id) {
            tracing::debug!(plugin = %id, "Plugin already registered, skipping");
            return Ok(existing.clone());
        }

        if self.config.is_disabled(&id) {
            tracing::info!(plugin = %id, "Plugin disabled, skipping");
            return Err(PluginHostError::Disabled { name: id });
        }

        if descriptor.api_version != API_VERSION {
            tracing::error!(
                plugin = %id,
                expected = API_VERSION,
                found = descriptor.api_version,
                "Plugin API version mismatch"
            );
            return Err(PluginHostError::ApiVersionMismatch {
                plugin: id,
                expected: API_VERSION,
                found: descriptor.api_version,
            });
        }

        let definition = Arc::new(PluginDefinition::from_descriptor(descriptor));

        for view_id in definition.views().iter().chain(definition.tabs()) {
            if let Some(existing) = self.views.check_conflict(&id, view_id) {
                tracing::error!(plugin = %id, tab = %view_id, owner = %existing, "View id conflict");
                return Err(PluginHostError::TabConflict {
                    tab: view_id.clone(),
                    existing_plugin: existing.to_string(),
                    new_plugin: id,
                });
            }
        }

        for dependency in definition.dependencies() {
            if !self.plugins.contains_key(dependency) {
                tracing::warn!(
                    plugin = %id,
                    dependency = %dependency,
                    "Plugin dependency is not registered yet"
                );
            }
        }

        let Some(registrar) = self.registrar.clone() else {
            tracing::error!(plugin = %id, "Host registration hook not available");
            return Err(PluginHostError::HostUnavailable { name: id });
        };

        let accepted = std::panic::catch_unwind(AssertUnwindSafe(|| {
            registrar.register_plugin(definition.clone())
        }))
        .unwrap_or_else(|_| {
            tracing::error!(plugin = %id, "Host registration hook panicked");
            false
        });
        if !accepted {
            tracing::error!(plugin = %id, "Host rejected plugin");
            return Err(PluginHostError::Rejected { name: id });
        }

        self.views.register(&id, definition.views(), definition.tabs());
        self.plugins.insert(id.clone(), definition.clone());
        self.order.push(id.clone());

        let ctx = InitContext::new(
            id.clone(),
            self.bridge.clone(),
            self.config.plugin_config(&id),
        );
        if let Err(e) = definition.init(&ctx) {
            tracing::error!(plugin = %id, error = %e, "Plugin init failed");
        }

        tracing::info!(
            plugin = %id,
            version = %definition.version(),
            "Plugin registered"
        );
        Ok(definition)
    }

    /// Check if a plugin id is registered
    pub fn is_registered(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }

    /// Get a registered plugin
    pub fn get(&self, id: &str) -> Option<Arc<PluginDefinition>> {
        self.plugins.get(id).cloned()
    }

    /// Registered plugins in registration order
    pub fn plugins(&self) -> impl Iterator<Item = &Arc<PluginDefinition>> {
        self.order.iter().filter_map(|id| self.plugins.get(id))
    }

    /// Get the number of registered plugins
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Claimed tabs in registration order
    pub fn tabs(&self) -> &[RegisteredTab] {
        self.views.tabs()
    }

    // ─── Messages ───────────────────────────────────────────────────

    /// Route a message through every plugin that handles its kind, in
    /// registration order. Each plugin sees the model produced by the
    /// previous one; a failing plugin is skipped.
    pub fn route(&self, message: &Message, model: &Model) -> UpdateOutcome {
        let mut current = model.clone();
        let mut handled_by = Vec::new();
        let mut failures = Vec::new();

        for plugin in self.plugins() {
            if !plugin.handles(&message.kind) {
                continue;
            }

            match plugin.update(message, &current) {
                Ok(next) => {
                    current = next;
                    handled_by.push(plugin.id().to_string());
                }
                Err(error) => {
                    failures.push(HandlerFailure {
                        plugin_id: plugin.id().to_string(),
                        kind: message.kind.clone(),
                        error,
                    });
                }
            }
        }

        UpdateOutcome {
            model: current,
            handled_by,
            failures,
        }
    }

    /// Apply a message and return the new model.
    ///
    /// Handler failures are logged and leave the prior model in place.
    pub fn update(&self, message: &Message, model: &Model) -> Model {
        let outcome = self.route(message, model);
        for failure in &outcome.failures {
            tracing::error!(
                plugin = %failure.plugin_id,
                kind = %failure.kind,
                error = %failure.error,
                "Update handler failed, keeping prior model"
            );
        }
        if outcome.handled_by.is_empty() && outcome.failures.is_empty() {
            tracing::debug!(kind = %message.kind, "No plugin handled message");
        }
        outcome.model
    }

    /// Decode a loosely-shaped message and apply it
    pub fn update_raw(&self, raw: &Value, model: &Model) -> Result<Model, PluginHostError> {
        let message = Message::from_json(raw)?;
        Ok(self.update(&message, model))
    }

    // ─── Views & Commands ───────────────────────────────────────────

    /// Render a view by plugin id, tab id or named view id.
    ///
    /// Returns `None` if no plugin owns the view or its view failed.
    pub fn render(&self, view_id: &str, model: &Model) -> Option<Markup> {
        self.render_view(view_id, model, None)
    }

    /// Render a view that decorates host markup.
    ///
    /// The owning plugin receives `default` and may wrap it. Falls back to
    /// `default` itself when no plugin owns the view or the view failed.
    pub fn render_with_default(&self, view_id: &str, model: &Model, default: &Markup) -> Markup {
        self.render_view(view_id, model, Some(default))
            .unwrap_or_else(|| default.clone())
    }

    fn render_view(&self, view_id: &str, model: &Model, default: Option<&Markup>) -> Option<Markup> {
        let plugin = self.views.find(view_id).and_then(|id| self.plugins.get(id))?;
        match plugin.render(view_id, model, &self.bridge, default) {
            Ok(markup) => Some(markup),
            Err(e) => {
                tracing::error!(plugin = %plugin.id(), view = %view_id, error = %e, "View failed");
                None
            }
        }
    }

    /// Run a command on the first plugin (in registration order) providing it
    pub fn execute_command(&self, name: &str, payload: &Value) -> Result<(), PluginHostError> {
        let plugin = self
            .plugins()
            .find(|p| p.has_command(name))
            .ok_or_else(|| PluginHostError::UnknownCommand(name.to_string()))?;

        match plugin.execute_command(name, payload) {
            Some(Ok(())) => Ok(()),
            Some(Err(source)) => {
                tracing::error!(plugin = %plugin.id(), command = %name, error = %source, "Command failed");
                Err(PluginHostError::Handler {
                    plugin: plugin.id().to_string(),
                    source,
                })
            }
            None => Err(PluginHostError::UnknownCommand(name.to_string())),
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}
