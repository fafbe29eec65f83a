//! Error types for the production line.

use crate::audit_actor::AuditError;
use crate::bus::LineAddress;
use crate::store_actor::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LineError {
    /// Not enough of a required part to build the order. Nothing was consumed.
    #[error("Line break at {line}: part {part} needs {required}, has {available}")]
    LineBreak {
        line: LineAddress,
        part: usize,
        required: i64,
        available: i64,
    },

    /// The order names a product that is not in the bill of materials.
    #[error("Unknown product: {0}")]
    UnknownProduct(usize),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}
