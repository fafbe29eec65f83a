//! Custom actions for the store actor.
//!
//! The atomic counter primitives. Each one runs to completion inside the actor before
//! the next request on any key is looked at, so a read-check-write on one counter can
//! never interleave with another.

/// Custom actions for [`Counter`](crate::model::Counter) entities.
#[derive(Debug, Clone, PartialEq)]
pub enum CounterAction {
    /// Adds a non-negative amount.
    Increment(i64),
    /// Subtracts a non-negative amount.
    ///
    /// # Errors
    /// Fails without touching the counter if it would go negative.
    Decrement(i64),
}

/// Results from CounterActions - variants match 1:1 with CounterAction.
/// Both carry the value after the operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CounterActionResult {
    Increment(i64),
    Decrement(i64),
}
