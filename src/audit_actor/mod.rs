//! Audit trails (restock requests, consumption, lost sales).

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::AuditClient;
use crate::framework::ResourceActor;
use crate::model::AuditLog;

/// Creates a new audit actor and its client.
pub fn new() -> (ResourceActor<AuditLog>, AuditClient) {
    let (actor, generic_client) = ResourceActor::new(256);
    (actor, AuditClient::new(generic_client))
}
