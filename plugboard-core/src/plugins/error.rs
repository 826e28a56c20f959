//! Plugin registry error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while registering or driving plugins
#[derive(Error, Debug)]
pub enum PluginHostError {
    /// Descriptor failed validation
    #[error("Invalid plugin descriptor: {0}")]
    InvalidDescriptor(String),

    /// API version mismatch between host and plugin
    #[error("API version mismatch for '{plugin}': host expects {expected}, plugin has {found}")]
    ApiVersionMismatch {
        plugin: String,
        expected: u32,
        found: u32,
    },

    /// Plugin is disabled in the host config
    #[error("Plugin '{name}' is disabled")]
    Disabled { name: String },

    /// Host registration hook is not installed
    #[error("Host registration hook not available, plugin '{name}' not registered")]
    HostUnavailable { name: String },

    /// Host registration hook refused the plugin
    #[error("Host rejected plugin '{name}'")]
    Rejected { name: String },

    /// Two plugins claimed the same tab
    #[error("Tab '{tab}' already claimed by '{existing_plugin}', cannot register for '{new_plugin}'")]
    TabConflict {
        tab: String,
        existing_plugin: String,
        new_plugin: String,
    },

    /// Raw message could not be decoded
    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] plugboard_api::MessageError),

    /// No plugin provides the command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// A plugin handler failed
    #[error("Plugin '{plugin}' failed: {source}")]
    Handler {
        plugin: String,
        #[source]
        source: plugboard_api::HandlerError,
    },

    /// Host config could not be read or written
    #[error("Config error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
