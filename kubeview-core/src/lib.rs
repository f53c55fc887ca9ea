//! KUBEVIEW Core - Data Types
//!
//! Resource identities, typed cache records, the assembled manifest view and
//! the kind handler capability. All other crates depend on this one.

mod config;
mod error;
mod event;
mod handler;
mod identity;
mod kind;
mod manifest;
mod metric;
mod view;

pub use config::*;
pub use error::*;
pub use event::*;
pub use handler::*;
pub use identity::*;
pub use kind::*;
pub use manifest::*;
pub use metric::*;
pub use view::*;
