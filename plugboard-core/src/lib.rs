//! plugboard-core: plugin registry for MVU hosts
//!
//! This crate provides the host side of plugboard:
//!
//! - **Registration** - [`PluginRegistry`] validates plugin descriptors and
//!   hands them to the host's registration hook
//! - **Message routing** - [`PluginRegistry::update`] folds a message through
//!   every plugin that handles it, isolating handler failures
//! - **View routing** - [`PluginRegistry::render`] renders a view by plugin id
//!   or tab id
//! - **Model migrations** - [`MigrationSet`] upgrades models persisted in an
//!   older shape
//!
//! # Quick Start
//!
//! ```no_run
//! use plugboard_api::{Message, Model, PluginDescriptor};
//! use plugboard_core::{HostConfig, PluginDefinition, PluginRegistry};
//! use std::sync::Arc;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut registry = PluginRegistry::new(HostConfig::default())
//!         .with_registrar(|_definition: Arc<PluginDefinition>| true);
//!
//!     registry.register(
//!         PluginDescriptor::builder("clock")
//!             .on("Tick", |_payload, model, state| {
//!                 Ok(Some(state.merge(model, serde_json::json!({"ticked": true}))?))
//!             })
//!             .build(),
//!     )?;
//!
//!     let model = registry.update(&Message::bare("Tick"), &Model::new());
//!     println!("{}", model.into_value());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                      Host                        │
//! │   model ──render──▶ view ──dispatch──▶ bridge    │
//! │     ▲                                   │        │
//! │     └─────────── update ◀───────────────┘        │
//! └──────────────────────┬───────────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────────┐
//! │                 PluginRegistry                   │
//! │  ┌────────────┐ ┌────────────┐ ┌──────────────┐  │
//! │  │ Definitions│ │ViewRegistry│ │ MessageTable │  │
//! │  └────────────┘ └────────────┘ └──────────────┘  │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod migration;
pub mod plugins;

// Re-export key types for convenience
pub use migration::{MODEL_VERSION_KEY, Migration, MigrationError, MigrationSet};
pub use plugins::{
    HandlerFailure, HostConfig, HostRegistrar, PluginDefinition, PluginHostError, PluginInfo,
    PluginRegistry, RegisteredTab, UpdateOutcome,
};
