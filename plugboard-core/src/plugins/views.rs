//! View routing - which plugin renders which view id, and which tabs exist

use std::collections::HashMap;

/// A navigation tab claimed by a plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredTab {
    /// Tab id
    pub tab: String,
    /// Plugin that owns the tab
    pub plugin_id: String,
}

/// Registry of view ids and tabs.
///
/// Every plugin with a view is reachable under its own id; a plugin that
/// claims tabs is reachable under each tab id as well, and named views under
/// their own ids. Tabs keep registration order so the host can lay out
/// navigation deterministically.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    /// Map from view id to owning plugin id
    routes: HashMap<String, String>,
    /// Claimed tabs in registration order
    tabs: Vec<RegisteredTab>,
}

impl ViewRegistry {
    /// Create an empty view registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `view_id` is already a view or tab of a plugin other
    /// than `plugin_id`.
    ///
    /// Returns the owning plugin if so.
    pub fn check_conflict(&self, plugin_id: &str, view_id: &str) -> Option<&str> {
        self.routes
            .get(view_id)
            .map(String::as_str)
            .or_else(|| {
                self.tabs
                    .iter()
                    .find(|t| t.tab == view_id)
                    .map(|t| t.plugin_id.as_str())
            })
            .filter(|owner| *owner != plugin_id)
    }

    /// Register the views and tabs of a plugin
    pub fn register(&mut self, plugin_id: &str, view_ids: &[String], tabs: &[String]) {
        for view_id in view_ids {
            self.routes.insert(view_id.clone(), plugin_id.to_string());
        }
        for tab in tabs {
            if !self.tabs.iter().any(|t| &t.tab == tab) {
                self.tabs.push(RegisteredTab {
                    tab: tab.clone(),
                    plugin_id: plugin_id.to_string(),
                });
            }
        }
    }

    /// Find the plugin that renders a view id
    pub fn find(&self, view_id: &str) -> Option<&str> {
        self.routes.get(view_id).map(String::as_str)
    }

    /// Claimed tabs in registration order
    pub fn tabs(&self) -> &[RegisteredTab] {
        &self.tabs
    }
}
