//! Error types for the audit actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuditError {
    /// An audit list must keep at least one entry.
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(usize),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for AuditError {
    fn from(msg: String) -> Self {
        AuditError::ActorCommunicationError(msg)
    }
}
