//! KUBEVIEW Cache - Keys, Client Boundary and Record Decoding
//!
//! Defines how resource identities map to cache keys, the read-only client
//! interface the manifest provider consumes, and the conversion of raw
//! records into typed ones. [`InMemoryCache`] implements the client for
//! tests and single-process deployments.

pub mod client;
pub mod converter;
pub mod in_memory;
pub mod keys;
pub mod record;

pub use client::{CacheClient, CacheStats};
pub use converter::{CacheDataConverter, RecordDecoder};
pub use in_memory::InMemoryCache;
pub use keys::{CacheKey, KeyType};
pub use record::CacheRecord;
