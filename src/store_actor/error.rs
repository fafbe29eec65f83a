//! Error types for the store actor.

use crate::model::CounterKey;
use thiserror::Error;

/// Errors that can occur during counter operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// A decrement asked for more than the counter holds.
    #[error("Insufficient stock at {key}: requested {requested}, available {available}")]
    InsufficientStock {
        key: CounterKey,
        requested: i64,
        available: i64,
    },

    /// Increment and decrement amounts must not be negative.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// An increment would push the counter past `i64::MAX`.
    #[error("Overflow at {key}: {value} + {amount}")]
    Overflow {
        key: CounterKey,
        value: i64,
        amount: i64,
    },

    /// Counters never hold negative values.
    #[error("Negative value {value} for {key}")]
    NegativeValue { key: CounterKey, value: i64 },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for StoreError {
    fn from(msg: String) -> Self {
        StoreError::ActorCommunicationError(msg)
    }
}
