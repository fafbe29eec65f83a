//! Central parts warehouse: serves line requests and reorders from the supplier.

pub mod entity;
pub mod error;

pub use entity::*;
pub use error::*;
