//! Production line: keeps a local parts buffer, reorders from the warehouse and
//! turns production orders into finished products.

pub mod entity;
pub mod error;

pub use entity::*;
pub use error::*;
