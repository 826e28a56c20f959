//! plugboard-api - Plugin authoring API for MVU hosts
//!
//! This crate provides the types plugin authors need to extend a host
//! application built in the Elm architecture: views rendered from the host
//! model, update handlers that compute a new model from a message, and a
//! per-plugin state namespace inside the model.
//!
//! # Example
//!
//! ```ignore
//! use plugboard_api::prelude::*;
//! use serde_json::json;
//!
//! let descriptor = PluginDescriptor::builder("slider")
//!     .name("Slider Tab Plugin")
//!     .tab("slider")
//!     .on("UpdateSliderValue", |payload, model, state| {
//!         let next = state.merge(model, json!({ "value": payload["value"] }))?;
//!         Ok(Some(next))
//!     })
//!     .view(|args| {
//!         let value = args.state.value(args.model, "value").unwrap_or(json!(0));
//!         Ok(Markup::new(format!("<input type=\"range\" value=\"{value}\">")))
//!     })
//!     .build();
//!
//! registry.register(descriptor)?;
//! ```

pub mod bridge;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod message;
pub mod model;

pub use bridge::{DispatchBridge, HostDispatch, WireShape};
pub use context::{InitContext, PluginConfig};
pub use descriptor::{
    CommandFn, HandlerFn, HandlerResult, InitFn, Markup, PluginDescriptor,
    PluginDescriptorBuilder, Update, UpdateArgs, UpdateFn, ViewArgs, ViewFn,
};
pub use error::{HandlerError, MessageError};
pub use message::{Message, MessageTable, core_messages};
pub use model::{CUSTOM_STATE_KEY, Model, StateScope, get_state, set_state};

/// Current plugin API version. Descriptors must match this exactly.
pub const API_VERSION: u32 = 1;

/// Re-export the authoring surface for plugin crates
pub mod prelude {
    pub use crate::{
        DispatchBridge, HandlerError, HandlerResult, InitContext, Markup, Message, MessageTable,
        Model, PluginDescriptor, StateScope, UpdateArgs, ViewArgs, get_state, set_state,
    };
}
