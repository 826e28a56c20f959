//! Messages and the message-constant table

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{HandlerError, MessageError};

/// Object keys accepted as the message kind when decoding, in priority order
pub const KIND_KEYS: &[&str] = &["type", "msgType", "messageType", "kind"];

/// A message sent from a plugin (or the host) to the update loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message kind, e.g. `"UpdateSliderValue"`
    pub kind: String,
    /// Arbitrary JSON payload, `{}` when absent
    #[serde(default = "empty_payload", deserialize_with = "payload_or_empty")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Map::new())
}

fn payload_or_empty<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let payload = Value::deserialize(deserializer)?;
    Ok(if payload.is_null() {
        empty_payload()
    } else {
        payload
    })
}

impl Message {
    /// Create a message with a payload
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        let payload = if payload.is_null() {
            empty_payload()
        } else {
            payload
        };
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Create a message with an empty payload
    pub fn bare(kind: impl Into<String>) -> Self {
        Self::new(kind, empty_payload())
    }

    /// Message kind
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Deserialize the payload into a typed value
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        Ok(T::deserialize(&self.payload)?)
    }

    /// Decode a message from any of the shapes plugins have historically sent:
    ///
    /// - `"Kind"`
    /// - `["Kind"]` or `["Kind", payload]`
    /// - `{"type": "Kind", "payload": ...}` (also `msgType`, `messageType`, `kind`)
    ///
    /// Anything else is rejected rather than defaulted.
    pub fn from_json(value: &Value) -> Result<Self, MessageError> {
        match value {
            Value::String(kind) => Self::checked(kind, empty_payload()),
            Value::Array(items) => match items.as_slice() {
                [Value::String(kind)] => Self::checked(kind, empty_payload()),
                [Value::String(kind), payload] => Self::checked(kind, payload.clone()),
                _ => Err(MessageError::InvalidTuple(value.to_string())),
            },
            Value::Object(map) => {
                let kind = match KIND_KEYS.iter().find_map(|key| map.get(*key)) {
                    Some(Value::String(kind)) => kind,
                    Some(other) => {
                        return Err(MessageError::UnsupportedShape(format!(
                            "{} message kind",
                            shape_name(other)
                        )));
                    }
                    None => return Err(MessageError::MissingKind),
                };
                let payload = map.get("payload").cloned().unwrap_or_else(empty_payload);
                Self::checked(kind, payload)
            }
            other => Err(MessageError::UnsupportedShape(shape_name(other).to_string())),
        }
    }

    fn checked(kind: &str, payload: Value) -> Result<Self, MessageError> {
        if kind.trim().is_empty() {
            return Err(MessageError::EmptyKind);
        }
        Ok(Self::new(kind, payload))
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─── Message Constants ───────────────────────────────────────────────

/// Message kinds understood by the host itself
pub mod core_messages {
    pub const INCREMENT_COUNTER: &str = "IncrementCounter";
    pub const DECREMENT_COUNTER: &str = "DecrementCounter";
    pub const NAVIGATE_TO: &str = "NavigateTo";
    pub const CLEAR_ERROR: &str = "ClearError";
    pub const SET_ERROR: &str = "SetError";

    pub const PLUGIN_TAB_ADDED: &str = "PluginTabAdded";
    pub const PLUGIN_REGISTERED: &str = "PluginRegistered";
    pub const PLUGINS_LOADED: &str = "PluginsLoaded";

    /// `(constant name, message kind)` pairs
    pub const ALL: &[(&str, &str)] = &[
        ("INCREMENT_COUNTER", INCREMENT_COUNTER),
        ("DECREMENT_COUNTER", DECREMENT_COUNTER),
        ("NAVIGATE_TO", NAVIGATE_TO),
        ("CLEAR_ERROR", CLEAR_ERROR),
        ("SET_ERROR", SET_ERROR),
        ("PLUGIN_TAB_ADDED", PLUGIN_TAB_ADDED),
        ("PLUGIN_REGISTERED", PLUGIN_REGISTERED),
        ("PLUGINS_LOADED", PLUGINS_LOADED),
    ];
}

/// Table of message-kind constants: the host's core kinds plus one map per
/// plugin namespace.
///
/// Purely a naming convenience; nothing routes through it.
#[derive(Debug, Clone, Serialize)]
pub struct MessageTable {
    core: BTreeMap<String, String>,
    namespaces: BTreeMap<String, BTreeMap<String, String>>,
}

impl MessageTable {
    /// Create a table holding the core message kinds
    pub fn new() -> Self {
        Self {
            core: core_messages::ALL
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            namespaces: BTreeMap::new(),
        }
    }

    /// Merge constants into a namespace, creating it if needed.
    ///
    /// Existing keys are overwritten. Returns the namespace after the merge.
    pub fn register_messages<I, K, V>(&mut self, namespace: &str, entries: I) -> &BTreeMap<String, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let ns = self.namespaces.entry(namespace.to_string()).or_default();
        for (key, kind) in entries {
            ns.insert(key.into(), kind.into());
        }
        tracing::debug!(namespace = %namespace, count = ns.len(), "Registered message constants");
        ns
    }

    /// Look up a core message kind by constant name
    pub fn core(&self, key: &str) -> Option<&str> {
        self.core.get(key).map(String::as_str)
    }

    /// Look up a namespaced message kind
    pub fn lookup(&self, namespace: &str, key: &str) -> Option<&str> {
        self.namespaces
            .get(namespace)
            .and_then(|ns| ns.get(key))
            .map(String::as_str)
    }

    /// Get all constants of a namespace
    pub fn namespace(&self, namespace: &str) -> Option<&BTreeMap<String, String>> {
        self.namespaces.get(namespace)
    }

    /// Iterate over registered namespace names
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }
}

impl Default for MessageTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_bare_string() {
        let msg = Message::from_json(&json!("ResetCounter")).unwrap();
        assert_eq!(msg.kind(), "ResetCounter");
        assert_eq!(msg.payload, json!({}));
    }

    #[test]
    fn test_decode_tuple() {
        let msg = Message::from_json(&json!(["DoubleCounter", {"currentValue": 3}])).unwrap();
        assert_eq!(msg.kind(), "DoubleCounter");
        assert_eq!(msg.payload["currentValue"], 3);

        let single = Message::from_json(&json!(["Ping"])).unwrap();
        assert_eq!(single.payload, json!({}));
    }

    #[test]
    fn test_decode_object_key_variants() {
        for key in ["type", "msgType", "messageType", "kind"] {
            let msg = Message::from_json(&json!({ key: "Save", "payload": {"id": 1} })).unwrap();
            assert_eq!(msg.kind(), "Save", "key {key} should be accepted");
            assert_eq!(msg.payload["id"], 1);
        }
    }

    #[test]
    fn test_decode_object_prefers_type_key() {
        let msg = Message::from_json(&json!({"messageType": "B", "type": "A"})).unwrap();
        assert_eq!(msg.kind(), "A");
    }

    #[test]
    fn test_decode_rejects_non_string_kind_key() {
        assert_eq!(
            Message::from_json(&json!({"type": 5, "msgType": "A"})),
            Err(MessageError::UnsupportedShape("number message kind".into()))
        );
        assert!(Message::from_json(&json!({"kind": null})).is_err());
    }

    #[test]
    fn test_deserialize_null_payload_becomes_empty_object() {
        let msg: Message =
            serde_json::from_value(json!({"kind": "Reset", "payload": null})).unwrap();
        assert_eq!(msg.payload, json!({}));

        let msg: Message = serde_json::from_value(json!({"kind": "Reset"})).unwrap();
        assert_eq!(msg.payload, json!({}));
    }

    #[test]
    fn test_decode_null_payload_becomes_empty_object() {
        let msg = Message::from_json(&json!(["Reset", null])).unwrap();
        assert_eq!(msg.payload, json!({}));
    }

    #[test]
    fn test_decode_rejects_malformed_shapes() {
        assert_eq!(Message::from_json(&json!("")), Err(MessageError::EmptyKind));
        assert_eq!(
            Message::from_json(&json!({"payload": {}})),
            Err(MessageError::MissingKind)
        );
        assert!(matches!(
            Message::from_json(&json!([1, 2])),
            Err(MessageError::InvalidTuple(_))
        ));
        assert!(matches!(
            Message::from_json(&json!(["A", {}, "extra"])),
            Err(MessageError::InvalidTuple(_))
        ));
        assert_eq!(
            Message::from_json(&json!(42)),
            Err(MessageError::UnsupportedShape("number".into()))
        );
    }

    #[test]
    fn test_payload_as_typed() {
        #[derive(Deserialize)]
        struct Slider {
            value: i64,
        }

        let msg = Message::new("UpdateSliderValue", json!({"value": 42}));
        let slider: Slider = msg.payload_as().unwrap();
        assert_eq!(slider.value, 42);

        let bad = Message::new("UpdateSliderValue", json!({"value": "high"}));
        assert!(matches!(
            bad.payload_as::<Slider>(),
            Err(HandlerError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_table_has_core_messages() {
        let table = MessageTable::new();
        assert_eq!(table.core("INCREMENT_COUNTER"), Some("IncrementCounter"));
        assert_eq!(table.core("PLUGINS_LOADED"), Some("PluginsLoaded"));
        assert_eq!(table.core("MISSING"), None);
    }

    #[test]
    fn test_register_messages_merges_namespace() {
        let mut table = MessageTable::new();
        table.register_messages("COUNTER_EXT", [("DOUBLE", "DoubleCounter")]);
        let ns = table.register_messages("COUNTER_EXT", [("RESET", "ResetCounter")]);

        assert_eq!(ns.len(), 2);
        assert_eq!(table.lookup("COUNTER_EXT", "DOUBLE"), Some("DoubleCounter"));
        assert_eq!(table.lookup("COUNTER_EXT", "RESET"), Some("ResetCounter"));
        assert_eq!(table.lookup("OTHER", "DOUBLE"), None);
        assert_eq!(table.namespaces().collect::<Vec<_>>(), vec!["COUNTER_EXT"]);
    }
}
