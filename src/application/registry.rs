//! Browse domain wiring
//!
//! A [`BrowseDomain`] bundles everything one dashboard screen needs: the
//! root listing, one provider per expandable kind, the action table and
//! the parameter defaults used to fill action requests. It is built once
//! and handed to the dashboard; nothing here is global.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{ActionParams, ActionRouter, NodeKind, ResourceProvider, RootSource};

/// Expandable kind -> provider table.
pub struct ProviderRegistry {
    roots: Arc<dyn RootSource>,
    providers: HashMap<NodeKind, Arc<dyn ResourceProvider>>,
}

impl ProviderRegistry {
    pub fn new(roots: Arc<dyn RootSource>) -> Self {
        Self {
            roots,
            providers: HashMap::new(),
        }
    }

    pub fn with_provider(mut self, kind: NodeKind, provider: Arc<dyn ResourceProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    pub fn roots(&self) -> Arc<dyn RootSource> {
        Arc::clone(&self.roots)
    }

    pub fn provider(&self, kind: NodeKind) -> Option<Arc<dyn ResourceProvider>> {
        self.providers.get(&kind).cloned()
    }
}

/// One browse screen: title, providers, actions and parameter defaults.
pub struct BrowseDomain {
    pub title: String,
    pub providers: ProviderRegistry,
    pub actions: ActionRouter,
    /// Merged under every action request; request values win.
    pub param_defaults: ActionParams,
    /// Used when neither the node nor its ancestors carry a resource group.
    pub fallback_resource_group: Option<String>,
}

impl BrowseDomain {
    pub fn new(title: impl Into<String>, providers: ProviderRegistry) -> Self {
        Self {
            title: title.into(),
            providers,
            actions: ActionRouter::new(),
            param_defaults: ActionParams::new(),
            fallback_resource_group: None,
        }
    }

    pub fn with_actions(mut self, actions: ActionRouter) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_default_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.param_defaults.insert(key.into(), value.into());
        self
    }

    pub fn with_fallback_resource_group(mut self, group: Option<String>) -> Self {
        self.fallback_resource_group = group;
        self
    }
}
