//! Stock counters: the shared key-value store every node reads and mutates.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::StoreClient;
use crate::framework::ResourceActor;
use crate::model::Counter;

/// Creates a new store actor and its client.
pub fn new() -> (ResourceActor<Counter>, StoreClient) {
    let (actor, generic_client) = ResourceActor::new(256);
    (actor, StoreClient::new(generic_client))
}
