//! KUBEVIEW Provider - Manifest View Assembly
//!
//! [`ManifestProvider`] turns a resource identity into a [`ManifestView`]
//! by reading the cache through a [`CacheClient`] and delegating status,
//! artifacts and warnings to the [`KindHandler`] registered for the kind.
//!
//! [`ManifestView`]: kubeview_core::ManifestView
//! [`CacheClient`]: kubeview_cache::CacheClient
//! [`KindHandler`]: kubeview_core::KindHandler

pub mod handlers;
pub mod provider;
pub mod registry;
pub mod telemetry;

pub use handlers::{
    ConfigResourceHandler, DaemonSetHandler, DeploymentHandler, GenericHandler, PodHandler,
    ReplicaSetHandler, StatefulSetHandler,
};
pub use provider::ManifestProvider;
pub use registry::HandlerRegistry;
pub use telemetry::{init_tracing, TelemetryConfig};
