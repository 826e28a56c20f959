//! PluginDefinition - a registered plugin with every author function behind
//! one calling convention and one failure boundary

use plugboard_api::{
    CommandFn, CUSTOM_STATE_KEY, DispatchBridge, HandlerError, InitContext, InitFn, Markup,
    Message, Model, PluginDescriptor, StateScope, Update, UpdateArgs, ViewArgs, ViewFn,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;

/// Normalized output of registration.
///
/// Errors and panics raised by author code surface as [`HandlerError`];
/// nothing escapes the definition.
pub struct PluginDefinition {
    id: String,
    name: String,
    version: String,
    api_version: u32,
    dependencies: Vec<String>,
    tabs: Vec<String>,
    views: Vec<String>,
    view: Option<ViewFn>,
    named_views: BTreeMap<String, ViewFn>,
    update: Update,
    init: Option<InitFn>,
    commands: BTreeMap<String, CommandFn>,
    scope: StateScope,
}

/// Serializable summary of a plugin definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub api_version: u32,
    pub dependencies: Vec<String>,
    pub tabs: Vec<String>,
    pub views: Vec<String>,
    pub commands: Vec<String>,
    /// Message kinds with a dedicated handler; empty for router plugins
    pub handlers: Vec<String>,
    pub router: bool,
}

/// Run author code, turning panics into [`HandlerError::Panicked`]
fn guarded<T>(f: impl FnOnce() -> Result<T, HandlerError>) -> Result<T, HandlerError> {
    std::panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(HandlerError::from_panic(payload)))
}

/// `CustomState` entries other than `plugin_id`
fn foreign_state(custom: Option<&Map<String, Value>>, plugin_id: &str) -> Map<String, Value> {
    let mut foreign = custom.cloned().unwrap_or_default();
    foreign.remove(plugin_id);
    foreign
}

impl PluginDefinition {
    /// Normalize a descriptor
    pub fn from_descriptor(descriptor: PluginDescriptor) -> Self {
        let tabs = descriptor.tabs;

        let mut views: Vec<String> = Vec::new();
        if descriptor.view.is_some() {
            views.push(descriptor.id.clone());
            views.extend(tabs.iter().cloned());
        }
        views.extend(descriptor.named_views.keys().cloned());
        let mut seen = std::collections::HashSet::new();
        views.retain(|view_id| seen.insert(view_id.clone()));

        Self {
            scope: StateScope::new(descriptor.id.clone()),
            id: descriptor.id,
            name: descriptor.name,
            version: descriptor.version,
            api_version: descriptor.api_version,
            dependencies: descriptor.dependencies,
            tabs,
            views,
            view: descriptor.view,
            named_views: descriptor.named_views,
            update: descriptor.update,
            init: descriptor.init,
            commands: descriptor.commands,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Tabs claimed by this plugin
    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    /// View ids this plugin renders: its id and tabs when it has a main view,
    /// then its named views
    pub fn views(&self) -> &[String] {
        &self.views
    }

    /// Whether the plugin has an update function for `kind`
    pub fn handles(&self, kind: &str) -> bool {
        self.update.handles(kind)
    }

    /// Whether the plugin provides a command
    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Render `view_id`.
    ///
    /// A named view wins over the main view. `default` is the markup the host
    /// would show without this plugin; decorator views wrap it.
    pub fn render(
        &self,
        view_id: &str,
        model: &Model,
        dispatch: &DispatchBridge,
        default: Option<&Markup>,
    ) -> Result<Markup, HandlerError> {
        let view = self
            .named_views
            .get(view_id)
            .or(self.view.as_ref())
            .ok_or_else(|| HandlerError::failed(format!("plugin '{}' has no view '{view_id}'", self.id)))?;

        let args = ViewArgs {
            plugin_id: &self.id,
            view_id,
            model,
            dispatch,
            state: &self.scope,
            default,
        };
        guarded(|| view(&args))
    }

    /// Apply a message.
    ///
    /// Returns the unchanged model when the plugin does not handle the kind or
    /// its handler returns `None`. Changes a handler makes to other plugins'
    /// `CustomState` entries are dropped.
    pub fn update(&self, message: &Message, model: &Model) -> Result<Model, HandlerError> {
        let next = match &self.update {
            Update::Router(router) => {
                let args = UpdateArgs {
                    kind: &message.kind,
                    payload: &message.payload,
                    model,
                    state: &self.scope,
                };
                guarded(|| router(&args))?
            }
            Update::Handlers(handlers) => match handlers.get(&message.kind) {
                Some(handler) => guarded(|| handler(&message.payload, model, &self.scope))?,
                None => None,
            },
        };
        Ok(match next {
            Some(next) => self.confine_state(model, next),
            None => model.clone(),
        })
    }

    /// Keep only this plugin's `CustomState` entry from `after`; every other
    /// entry is taken from `before`.
    fn confine_state(&self, before: &Model, mut after: Model) -> Model {
        let before_custom = before.get(CUSTOM_STATE_KEY);
        if before_custom == after.get(CUSTOM_STATE_KEY) {
            return after;
        }

        if foreign_state(before.custom_state(), &self.id) != foreign_state(after.custom_state(), &self.id) {
            tracing::warn!(plugin = %self.id, "Update touched state of other plugins, discarding those changes");
        }

        let own = after
            .custom_state()
            .and_then(|custom| custom.get(&self.id))
            .cloned();
        let mut custom = before.custom_state().cloned().unwrap_or_default();
        match own {
            Some(slot) => {
                custom.insert(self.id.clone(), slot);
            }
            None => {
                custom.remove(&self.id);
            }
        }

        match before_custom {
            None if custom.is_empty() => {
                after.remove(CUSTOM_STATE_KEY);
            }
            Some(original) if !original.is_object() && custom.is_empty() => {
                after.insert(CUSTOM_STATE_KEY, original.clone());
            }
            _ => after.insert(CUSTOM_STATE_KEY, Value::Object(custom)),
        }
        after
    }

    /// Run the plugin's init function, if any
    pub fn init(&self, ctx: &InitContext) -> Result<(), HandlerError> {
        match &self.init {
            Some(init) => guarded(|| init(ctx)),
            None => Ok(()),
        }
    }

    /// Run a command. Returns `None` if the plugin has no such command.
    pub fn execute_command(
        &self,
        name: &str,
        payload: &serde_json::Value,
    ) -> Option<Result<(), HandlerError>> {
        self.commands
            .get(name)
            .map(|command| guarded(|| command(payload)))
    }

    /// Summary for listings
    pub fn info(&self) -> PluginInfo {
        let (handlers, router) = match &self.update {
            Update::Router(_) => (Vec::new(), true),
            Update::Handlers(handlers) => (handlers.keys().cloned().collect(), false),
        };
        PluginInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            api_version: self.api_version,
            dependencies: self.dependencies.clone(),
            tabs: self.tabs.clone(),
            views: self.views.clone(),
            commands: self.commands.keys().cloned().collect(),
            handlers,
            router,
        }
    }
}

impl std::fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDefinition")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("tabs", &self.tabs)
            .field("views", &self.views)
            .field("update", &self.update)
            .finish()
    }
}
