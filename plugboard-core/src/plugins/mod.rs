//! Plugin registration and dispatch
//!
//! - [`PluginRegistry`]: registers plugin descriptors with the host and routes
//!   messages and view requests to them
//! - [`PluginDefinition`]: a registered plugin, with every author function
//!   behind one failure boundary
//! - [`HostConfig`]: disabled plugins, wire shape and per-plugin settings
//! - [`PluginHostError`]: error types for registry operations
//!
//! # Example
//!
//! ```ignore
//! use plugboard_core::plugins::{HostConfig, PluginRegistry};
//!
//! let mut registry = PluginRegistry::new(HostConfig::load(&HostConfig::default_path())?)
//!     .with_registrar(|definition| host.add_plugin(definition));
//! registry.install_dispatch(move |wire| host_dispatch(wire));
//!
//! registry.register(slider::descriptor())?;
//! let model = registry.update(&Message::new("UpdateSliderValue", json!({"value": 42})), &model);
//! let markup = registry.render("slider", &model);
//! ```

mod config;
mod definition;
mod error;
mod registry;
mod views;

pub use config::HostConfig;
pub use definition::{PluginDefinition, PluginInfo};
pub use error::PluginHostError;
pub use registry::{HandlerFailure, HostRegistrar, PluginRegistry, UpdateOutcome};
pub use views::{RegisteredTab, ViewRegistry};
