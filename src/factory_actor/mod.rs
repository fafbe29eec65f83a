//! Factories: size the daily batch and hand one production order to each line.

pub mod entity;
pub mod error;

pub use entity::*;
pub use error::*;
