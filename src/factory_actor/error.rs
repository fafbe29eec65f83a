use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FactoryError {
    /// The status vector must carry one entry per product.
    #[error("Stock vector has {got} entries, expected {expected}")]
    StockVectorLength { expected: usize, got: usize },
}
