//! Runtime orchestration and lifecycle management.
//!
//! This module contains the infrastructure for running a simulation, including:
//!
//! - **Actor lifecycle management**: Starting, wiring, and shutting down actors
//! - **Bootstrap**: Seeding the store before the first simulated day
//! - **Observability setup**: Initializing tracing and logging
//!
//! # Main Components
//!
//! - [`SupplyChainSystem`] - The orchestrator that owns every actor and the shared context
//! - [`seed_counters`] - Writes the initial counter values
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod bootstrap;
pub mod supply_chain;
pub mod tracing;

pub use bootstrap::*;
pub use supply_chain::*;
pub use self::tracing::setup_tracing;
