//! Pure data structures shared by the actors.
//!
//! [`Counter`] and [`AuditLog`] implement
//! [`ActorEntity`](crate::framework::ActorEntity) and live in the shared store; the
//! rest are plain values owned by a single node.

pub mod audit;
pub mod bom;
pub mod counter;
pub mod kanban;
pub mod replenishment;

pub use audit::*;
pub use bom::*;
pub use counter::*;
pub use kanban::*;
pub use replenishment::*;
