//! Plugin descriptors - the one canonical shape plugin authors hand to the registry

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::bridge::DispatchBridge;
use crate::context::InitContext;
use crate::error::HandlerError;
use crate::model::{Model, StateScope};

/// Rendered view output.
///
/// plugboard does not render anything itself; views produce markup text that
/// the host mounts however it likes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Markup {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Markup {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl std::fmt::Display for Markup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arguments every view receives
pub struct ViewArgs<'a> {
    /// Id of the plugin that owns the view
    pub plugin_id: &'a str,
    /// View id being rendered: the plugin id, a tab id or a named view id
    pub view_id: &'a str,
    /// Current model snapshot
    pub model: &'a Model,
    /// Dispatch handle for user interaction
    pub dispatch: &'a DispatchBridge,
    /// The owning plugin's state scope
    pub state: &'a StateScope,
    /// Markup the host would render without this plugin, if any.
    ///
    /// Decorator views wrap it instead of replacing it.
    pub default: Option<&'a Markup>,
}

/// Arguments an update router receives
pub struct UpdateArgs<'a> {
    /// Message kind
    pub kind: &'a str,
    /// Message payload
    pub payload: &'a Value,
    /// Current model snapshot
    pub model: &'a Model,
    /// The owning plugin's state scope
    pub state: &'a StateScope,
}

/// Result of an update function: `Ok(None)` leaves the model unchanged
pub type HandlerResult = Result<Option<Model>, HandlerError>;

pub type ViewFn = Arc<dyn Fn(&ViewArgs<'_>) -> Result<Markup, HandlerError> + Send + Sync>;
pub type UpdateFn = Arc<dyn Fn(&UpdateArgs<'_>) -> HandlerResult + Send + Sync>;
pub type HandlerFn = Arc<dyn Fn(&Value, &Model, &StateScope) -> HandlerResult + Send + Sync>;
pub type InitFn = Arc<dyn Fn(&InitContext) -> Result<(), HandlerError> + Send + Sync>;
pub type CommandFn = Arc<dyn Fn(&Value) -> Result<(), HandlerError> + Send + Sync>;

/// How a plugin reacts to messages
#[derive(Clone)]
pub enum Update {
    /// A single function receiving every message
    Router(UpdateFn),
    /// One function per message kind
    Handlers(BTreeMap<String, HandlerFn>),
}

impl Update {
    /// Whether this plugin wants to see messages of `kind`
    pub fn handles(&self, kind: &str) -> bool {
        match self {
            Self::Router(_) => true,
            Self::Handlers(handlers) => handlers.contains_key(kind),
        }
    }
}

impl std::fmt::Debug for Update {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Router(_) => f.write_str("Router"),
            Self::Handlers(handlers) => f
                .debug_tuple("Handlers")
                .field(&handlers.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Everything a plugin author supplies.
///
/// Build one with [`PluginDescriptor::builder`].
#[derive(Clone)]
pub struct PluginDescriptor {
    /// Unique plugin id, also the `CustomState` namespace
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Plugin version
    pub version: String,
    /// API version the plugin was written against
    pub api_version: u32,
    /// Ids of plugins this one expects to be registered first
    pub dependencies: Vec<String>,
    /// Navigation tabs claimed by this plugin, in declaration order
    pub tabs: Vec<String>,
    /// Main view function, rendered for the plugin id and every tab
    pub view: Option<ViewFn>,
    /// Extra views keyed by view id
    pub named_views: BTreeMap<String, ViewFn>,
    /// Update router or per-message handlers
    pub update: Update,
    /// Runs once after the host accepted the plugin
    pub init: Option<InitFn>,
    /// Side-effecting command handlers keyed by command name
    pub commands: BTreeMap<String, CommandFn>,
}

impl PluginDescriptor {
    /// Start building a descriptor for `id`
    pub fn builder(id: impl Into<String>) -> PluginDescriptorBuilder {
        PluginDescriptorBuilder::new(id.into())
    }
}

impl std::fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("api_version", &self.api_version)
            .field("dependencies", &self.dependencies)
            .field("tabs", &self.tabs)
            .field("view", &self.view.is_some())
            .field("named_views", &self.named_views.keys().collect::<Vec<_>>())
            .field("update", &self.update)
            .field("init", &self.init.is_some())
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`PluginDescriptor`]
pub struct PluginDescriptorBuilder {
    id: String,
    name: Option<String>,
    version: String,
    api_version: u32,
    dependencies: Vec<String>,
    tabs: Vec<String>,
    view: Option<ViewFn>,
    named_views: BTreeMap<String, ViewFn>,
    router: Option<UpdateFn>,
    handlers: BTreeMap<String, HandlerFn>,
    init: Option<InitFn>,
    commands: BTreeMap<String, CommandFn>,
}

impl PluginDescriptorBuilder {
    fn new(id: String) -> Self {
        Self {
            id,
            name: None,
            version: "1.0.0".to_string(),
            api_version: crate::API_VERSION,
            dependencies: Vec::new(),
            tabs: Vec::new(),
            view: None,
            named_views: BTreeMap::new(),
            router: None,
            handlers: BTreeMap::new(),
            init: None,
            commands: BTreeMap::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Override the API version (defaults to [`crate::API_VERSION`])
    pub fn api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    /// Declare a dependency on another plugin id
    pub fn depends_on(mut self, plugin_id: impl Into<String>) -> Self {
        let plugin_id = plugin_id.into();
        if !self.dependencies.contains(&plugin_id) {
            self.dependencies.push(plugin_id);
        }
        self
    }

    /// Claim a navigation tab; the main view is also registered under this id.
    ///
    /// May be called more than once.
    pub fn tab(mut self, tab: impl Into<String>) -> Self {
        let tab = tab.into();
        if !self.tabs.contains(&tab) {
            self.tabs.push(tab);
        }
        self
    }

    pub fn view<F>(mut self, view: F) -> Self
    where
        F: Fn(&ViewArgs<'_>) -> Result<Markup, HandlerError> + Send + Sync + 'static,
    {
        self.view = Some(Arc::new(view));
        self
    }

    /// Add a view reachable only under `view_id`
    pub fn view_named<F>(mut self, view_id: impl Into<String>, view: F) -> Self
    where
        F: Fn(&ViewArgs<'_>) -> Result<Markup, HandlerError> + Send + Sync + 'static,
    {
        self.named_views.insert(view_id.into(), Arc::new(view));
        self
    }

    /// Route every message through one function
    pub fn update<F>(mut self, update: F) -> Self
    where
        F: Fn(&UpdateArgs<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.router = Some(Arc::new(update));
        self
    }

    /// Handle one message kind. Ignored if [`update`](Self::update) is also set.
    pub fn on<F>(mut self, kind: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value, &Model, &StateScope) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.insert(kind.into(), Arc::new(handler));
        self
    }

    pub fn init<F>(mut self, init: F) -> Self
    where
        F: Fn(&InitContext) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(init));
        self
    }

    pub fn command<F>(mut self, name: impl Into<String>, command: F) -> Self
    where
        F: Fn(&Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.commands.insert(name.into(), Arc::new(command));
        self
    }

    pub fn build(self) -> PluginDescriptor {
        let update = match self.router {
            Some(router) => {
                if !self.handlers.is_empty() {
                    tracing::warn!(
                        plugin = %self.id,
                        handlers = self.handlers.len(),
                        "Plugin has both an update router and per-message handlers; using the router"
                    );
                }
                Update::Router(router)
            }
            None => Update::Handlers(self.handlers),
        };

        PluginDescriptor {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            version: self.version,
            api_version: self.api_version,
            dependencies: self.dependencies,
            tabs: self.tabs,
            view: self.view,
            named_views: self.named_views,
            update,
            init: self.init,
            commands: self.commands,
        }
    }
}
