use crate::audit_actor::AuditError;
use crate::store_actor::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductStockError {
    #[error("Unknown product: {0}")]
    UnknownProduct(usize),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}
