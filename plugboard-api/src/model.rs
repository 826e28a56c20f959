//! Host model and the namespaced plugin state store
//!
//! The host owns the [`Model`] and treats it as an immutable snapshot. Plugins
//! keep their own state under `CustomState[<plugin id>]` and only ever touch
//! it through [`get_state`], [`set_state`] or a [`StateScope`] bound to their
//! id. Every write returns a new model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::HandlerError;

/// Model key holding per-plugin state
pub const CUSTOM_STATE_KEY: &str = "CustomState";

/// Application state snapshot owned by the host.
///
/// Opaque to plugboard apart from the [`CUSTOM_STATE_KEY`] extension area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(Map<String, Value>);

impl Model {
    /// Create an empty model
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a model from a JSON value. Returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Get a top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Return a copy of this model with one top-level field replaced
    pub fn with(&self, key: &str, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.0.insert(key.to_string(), value.into());
        next
    }

    /// Set a top-level field in place (host-side construction)
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Remove a top-level field in place
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// The `CustomState` object, if present and an object
    pub fn custom_state(&self) -> Option<&Map<String, Value>> {
        self.0.get(CUSTOM_STATE_KEY).and_then(Value::as_object)
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Model {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Read a plugin's state.
///
/// Returns an empty map when the model has no `CustomState`, no entry for the
/// plugin, or an entry that is not an object.
pub fn get_state(plugin_id: &str, model: &Model) -> Map<String, Value> {
    model
        .custom_state()
        .and_then(|custom| custom.get(plugin_id))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Return a new model whose `CustomState[plugin_id]` is shallow-merged with
/// `partial`. Keys absent from `partial` are preserved; `model` is untouched.
pub fn set_state(plugin_id: &str, partial: Map<String, Value>, model: &Model) -> Model {
    let mut next = model.clone();
    if partial.is_empty() {
        return next;
    }

    let custom = next
        .0
        .entry(CUSTOM_STATE_KEY.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !custom.is_object() {
        tracing::warn!(plugin = %plugin_id, "CustomState was not an object, replacing it");
        *custom = Value::Object(Map::new());
    }

    if let Value::Object(custom) = custom {
        let slot = custom
            .entry(plugin_id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(slot) = slot {
            slot.extend(partial);
        }
    }

    next
}

/// Read/write access to the state of exactly one plugin.
///
/// Handlers receive a scope bound to their own id, so they cannot address
/// another plugin's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateScope {
    plugin_id: String,
}

impl StateScope {
    /// Create a scope for a plugin id
    pub fn new(plugin_id: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
        }
    }

    /// The plugin id this scope is bound to
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// This plugin's state in `model`
    pub fn get(&self, model: &Model) -> Map<String, Value> {
        get_state(&self.plugin_id, model)
    }

    /// A single field of this plugin's state
    pub fn value(&self, model: &Model, key: &str) -> Option<Value> {
        self.get(model).remove(key)
    }

    /// Merge `partial` into this plugin's state, returning a new model
    pub fn set(&self, model: &Model, partial: Map<String, Value>) -> Model {
        set_state(&self.plugin_id, partial, model)
    }

    /// Like [`StateScope::set`] but takes any JSON value, which must be an object
    pub fn merge(&self, model: &Model, partial: Value) -> Result<Model, HandlerError> {
        match partial {
            Value::Object(map) => Ok(self.set(model, map)),
            other => Err(HandlerError::InvalidState(format!(
                "plugin '{}' state must be an object, got {}",
                self.plugin_id, other
            ))),
        }
    }
}
