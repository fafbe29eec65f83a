//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient).

pub mod actor_client;
pub mod audit_client;
pub mod context;
pub mod store_client;

pub use actor_client::*;
pub use audit_client::*;
pub use context::*;
pub use store_client::*;
