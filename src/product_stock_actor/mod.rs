//! Finished-goods stock: absorbs line output, plays the customers, and tells the
//! factories how much is left.

pub mod entity;
pub mod error;

pub use entity::*;
pub use error::*;
