//! Generic actor framework for the simulation.
//!
//! Two kinds of actors live here:
//!
//! - [`ResourceActor`] owns a keyed collection of [`ActorEntity`] values and processes
//!   requests one at a time. The shared store is built on it.
//! - [`NodeActor`] drives a [`Node`]: one simulation participant that reacts to bus
//!   frames and to the day ticker.
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning full actors.

pub mod core;
pub mod mock;
pub mod node;

// Re-export core types for convenience
pub use self::core::*;
pub use node::{Node, NodeActor, Schedule};
