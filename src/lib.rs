//! # Kanban Supply Chain
//!
//! > **A multi-tier manufacturing supply chain, simulated as a society of actors.**
//!
//! Supplier → Warehouse → Production Lines → Factories → Finished-Goods Stock → Customers.
//! Every participant is an autonomous actor with a daily duty and a message listener.
//! They talk over named pub/sub channels and keep their stock in a shared counter store.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Two kinds of actors
//! - **Resource actors** ([`framework::ResourceActor`]) own keyed state and process one
//!   request at a time. The shared store is one: every increment and checked decrement
//!   on a counter is atomic because nothing else runs inside the actor meanwhile.
//! - **Node actors** ([`framework::NodeActor`]) drive one simulation participant. The
//!   bus inbox and the day ticker are awaited in a single `select!`, so a node never
//!   runs its daily check halfway through applying a shipment.
//!
//! ### Kanban
//! Stock levels are classified green, yellow or red against two thresholds
//! ([`model::KanbanThresholds`]). Yellow or red parts are reordered in one request,
//! and a [`model::WaitingFlag`] keeps the requester quiet until the shipment lands.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Wire format
//! Frames keep the classic `/`-and-`;` text format and are decoded exactly once, at
//! the bus boundary, into [`bus::Message`].
//!
//! ### 2. Type-Safe Error Handling
//! Each actor defines its own error type (e.g., `LineError`, `WarehouseError`).
//! Failures are handled where they happen and logged; only a broken store at startup
//! stops the run.
//!
//! ### 3. Async Context Injection
//! Nodes receive a [`clients::NodeContext`] (store, audit lists, bus) when they are
//! started, not when they are built.
//!
//! ### 4. Observability
//! `tracing` everywhere, one span per node. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`], [`bus`])
//! Generic actors, the node loop, the channels and the codec.
//!
//! ### 2. The Orchestrator ([`lifecycle`], [`config`])
//! - **Role**: Validates the configuration, seeds the store, spins up every node,
//!   and collects the [`SimulationReport`](lifecycle::SimulationReport) at shutdown.
//! - **Key items**: [`SupplyChainSystem`](lifecycle::SupplyChainSystem).
//!
//! ### 3. The Interface ([`clients`])
//! [`StoreClient`](clients::StoreClient) and [`AuditClient`](clients::AuditClient)
//! wrap the generic `ResourceClient` in domain operations.
//!
//! ### 4. The Implementation
//! - Store: [`store_actor`], [`audit_actor`]
//! - Participants: [`supplier_actor`], [`warehouse_actor`], [`line_actor`],
//!   [`factory_actor`], [`product_stock_actor`]
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Five short days with reproducible demand
//! RUST_LOG=info cargo run -- --days 5 --day-length-ms 200 --seed 7
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod audit_actor;
pub mod bus;
pub mod clients;
pub mod config;
pub mod factory_actor;
pub mod framework;
pub mod lifecycle;
pub mod line_actor;
pub mod model;
pub mod product_stock_actor;
pub mod store_actor;
pub mod supplier_actor;
pub mod warehouse_actor;
