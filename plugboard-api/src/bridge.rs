//! Dispatch bridge - the only channel through which plugins request state changes
//!
//! The host installs its dispatch hook once it has finished bootstrapping,
//! which may be after plugins were registered. Until then every dispatch is
//! logged and dropped. There is no queue and no retry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};

use crate::message::Message;

/// Host-side dispatch entry point
pub trait HostDispatch: Send + Sync {
    /// Deliver a message in the host's wire shape
    fn dispatch(&self, wire: Value);
}

impl<F> HostDispatch for F
where
    F: Fn(Value) + Send + Sync,
{
    fn dispatch(&self, wire: Value) {
        self(wire)
    }
}

/// Wire shape the host expects from [`HostDispatch::dispatch`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireShape {
    /// `[kind, payload]`
    #[default]
    Tuple,
    /// `{"type": kind, "payload": payload}`
    Object,
}

impl WireShape {
    /// Encode a message for the host
    pub fn encode(self, message: &Message) -> Value {
        match self {
            Self::Tuple => Value::Array(vec![
                Value::String(message.kind.clone()),
                message.payload.clone(),
            ]),
            Self::Object => {
                let mut map = Map::new();
                map.insert("type".to_string(), Value::String(message.kind.clone()));
                map.insert("payload".to_string(), message.payload.clone());
                Value::Object(map)
            }
        }
    }
}

struct BridgeInner {
    shape: WireShape,
    hook: RwLock<Option<Arc<dyn HostDispatch>>>,
}

/// Forwards plugin messages to the host's dispatch hook.
///
/// Clones share the same hook, so a bridge handed to a plugin during
/// registration starts delivering as soon as the host installs its hook.
#[derive(Clone)]
pub struct DispatchBridge {
    inner: Arc<BridgeInner>,
}

impl DispatchBridge {
    /// Create a bridge encoding messages in the given wire shape
    pub fn new(shape: WireShape) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                shape,
                hook: RwLock::new(None),
            }),
        }
    }

    /// Wire shape used for the host hook
    pub fn shape(&self) -> WireShape {
        self.inner.shape
    }

    /// Install (or replace) the host dispatch hook
    pub fn install(&self, hook: impl HostDispatch + 'static) {
        self.install_arc(Arc::new(hook));
    }

    /// Install a shared host dispatch hook
    pub fn install_arc(&self, hook: Arc<dyn HostDispatch>) {
        let mut slot = self.inner.hook.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            tracing::debug!("Replacing host dispatch hook");
        }
        *slot = Some(hook);
    }

    /// Remove the host dispatch hook (host teardown)
    pub fn uninstall(&self) {
        *self.inner.hook.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether the host hook is installed
    pub fn is_ready(&self) -> bool {
        self.inner
            .hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Dispatch a message kind with a payload.
    ///
    /// Returns `false` if the hook is not installed, the kind is empty, or
    /// the hook panicked.
    pub fn dispatch(&self, kind: &str, payload: Value) -> bool {
        if kind.trim().is_empty() {
            tracing::warn!("Refusing to dispatch message with empty kind");
            return false;
        }
        self.send(Message::new(kind, payload))
    }

    /// Dispatch a message with an empty payload
    pub fn dispatch_bare(&self, kind: &str) -> bool {
        self.dispatch(kind, Value::Object(Map::new()))
    }

    /// Dispatch an already-built message
    pub fn send(&self, message: Message) -> bool {
        let hook = self
            .inner
            .hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let Some(hook) = hook else {
            tracing::warn!(kind = %message.kind, "Host dispatch not available, dropping message");
            return false;
        };

        tracing::debug!(kind = %message.kind, "Dispatching message");
        let wire = self.inner.shape.encode(&message);
        match std::panic::catch_unwind(AssertUnwindSafe(|| hook.dispatch(wire))) {
            Ok(()) => true,
            Err(_) => {
                tracing::error!(kind = %message.kind, "Host dispatch panicked");
                false
            }
        }
    }

    /// Decode a message from a loosely-shaped JSON value and dispatch it.
    ///
    /// Malformed values are logged and rejected.
    pub fn dispatch_raw(&self, raw: &Value) -> bool {
        match Message::from_json(raw) {
            Ok(message) => self.send(message),
            Err(e) => {
                tracing::warn!(error = %e, "Rejected malformed message");
                false
            }
        }
    }
}

impl Default for DispatchBridge {
    fn default() -> Self {
        Self::new(WireShape::default())
    }
}

impl std::fmt::Debug for DispatchBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchBridge")
            .field("shape", &self.inner.shape)
            .field("ready", &self.is_ready())
            .finish()
    }
}
