use crate::bus::Bus;
use crate::clients::{AuditClient, StoreClient};
use tokio::task::JoinHandle;

/// Dependencies injected into every node: the shared store, the audit lists and the bus.
#[derive(Clone)]
pub struct NodeContext {
    pub store: StoreClient,
    pub audit: AuditClient,
    pub bus: Bus,
}

impl NodeContext {
    pub fn new(store: StoreClient, audit: AuditClient, bus: Bus) -> Self {
        Self { store, audit, bus }
    }

    /// Spawns fresh store and audit actors and wires a context to them.
    ///
    /// The actors stop once every clone of the returned context is dropped; await the
    /// handles after that.
    pub fn in_memory(bus_capacity: usize) -> (Self, Vec<JoinHandle<()>>) {
        let (store_actor, store) = crate::store_actor::new();
        let (audit_actor, audit) = crate::audit_actor::new();
        let handles = vec![
            tokio::spawn(store_actor.run(())),
            tokio::spawn(audit_actor.run(())),
        ];
        (Self::new(store, audit, Bus::new(bus_capacity)), handles)
    }
}
