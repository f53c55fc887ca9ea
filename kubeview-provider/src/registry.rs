//! Kind handler registry.

use std::collections::HashMap;
use std::sync::Arc;

use kubeview_core::{Kind, KindHandler, BUILTIN_KINDS};

use crate::handlers::{
    ConfigResourceHandler, DaemonSetHandler, DeploymentHandler, GenericHandler, PodHandler,
    ReplicaSetHandler, StatefulSetHandler,
};

/// Maps `(account, kind)` to the handler that interprets manifests.
///
/// Account-specific registrations take precedence over account-wide
/// defaults. Registration takes `&mut self`; once built, the registry is
/// shared behind an `Arc` and only read.
///
/// # Example
/// ```ignore
/// let mut registry = HandlerRegistry::with_builtin_handlers();
/// registry.register_for_account("legacy", Arc::new(GenericHandler::new(Kind::Deployment)));
/// let handler = registry.resolve("prod", &Kind::Deployment);
/// ```
pub struct HandlerRegistry {
    defaults: HashMap<Kind, Arc<dyn KindHandler>>,
    accounts: HashMap<String, HashMap<Kind, Arc<dyn KindHandler>>>,
}

impl HandlerRegistry {
    /// Create an empty registry. Nothing resolves until handlers are registered.
    pub fn new() -> Self {
        Self {
            defaults: HashMap::new(),
            accounts: HashMap::new(),
        }
    }

    /// A registry with a handler for every built-in kind.
    ///
    /// Kinds without a dedicated handler get [`GenericHandler`]. Custom kinds
    /// are not registered.
    pub fn with_builtin_handlers() -> Self {
        let mut registry = Self::new();
        for kind in BUILTIN_KINDS {
            registry.register(builtin_handler(kind));
        }
        registry
    }

    /// Register an account-wide handler for `handler.kind()`.
    ///
    /// Replaces any previous default for that kind.
    pub fn register(&mut self, handler: Arc<dyn KindHandler>) {
        self.defaults.insert(handler.kind(), handler);
    }

    /// Register a handler that only applies to `account`.
    pub fn register_for_account(
        &mut self,
        account: impl Into<String>,
        handler: Arc<dyn KindHandler>,
    ) {
        self.accounts
            .entry(account.into())
            .or_default()
            .insert(handler.kind(), handler);
    }

    /// Handler for `kind` as seen by `account`, if any.
    pub fn resolve(&self, account: &str, kind: &Kind) -> Option<Arc<dyn KindHandler>> {
        self.accounts
            .get(account)
            .and_then(|handlers| handlers.get(kind))
            .or_else(|| self.defaults.get(kind))
            .cloned()
    }

    /// Check if any handler (default or account-specific) exists for `kind`.
    pub fn has_handler(&self, kind: &Kind) -> bool {
        self.defaults.contains_key(kind)
            || self.accounts.values().any(|handlers| handlers.contains_key(kind))
    }

    /// Number of account-wide handlers.
    pub fn len(&self) -> usize {
        self.defaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty() && self.accounts.is_empty()
    }

    /// Kinds with an account-wide handler.
    pub fn kinds(&self) -> Vec<Kind> {
        let mut kinds: Vec<Kind> = self.defaults.keys().cloned().collect();
        kinds.sort();
        kinds
    }
}

fn builtin_handler(kind: Kind) -> Arc<dyn KindHandler> {
    match kind {
        Kind::Deployment => Arc::new(DeploymentHandler),
        Kind::ReplicaSet => Arc::new(ReplicaSetHandler),
        Kind::StatefulSet => Arc::new(StatefulSetHandler),
        Kind::DaemonSet => Arc::new(DaemonSetHandler),
        Kind::Pod => Arc::new(PodHandler),
        Kind::ConfigMap | Kind::Secret => Arc::new(ConfigResourceHandler::new(kind)),
        other => Arc::new(GenericHandler::new(other)),
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("defaults", &self.defaults.len())
            .field("accounts", &self.accounts.keys().collect::<Vec<_>>())
            .finish()
    }
}
