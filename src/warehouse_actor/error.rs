//! Error types for the warehouse.

use crate::bus::LineAddress;
use crate::store_actor::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WarehouseError {
    /// A requested part is below the shipment size. Nothing was shipped.
    #[error("Stockout for {line}: part {part} needs {required}, has {available}")]
    Stockout {
        line: LineAddress,
        part: usize,
        required: i64,
        available: i64,
    },

    #[error("Unknown part {part}, the catalog has {num_parts}")]
    UnknownPart { part: usize, num_parts: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}
