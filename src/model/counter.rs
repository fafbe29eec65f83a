//! A named integer counter in the shared store.
//!
//! # Actor Framework
//! [`Counter`] implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
//! allowing it to be managed by a [`ResourceActor`](crate::framework::ResourceActor).
//!
//! See [`store_actor`](crate::store_actor) for details on:
//! - Creation parameters ([`CounterSeed`])
//! - Update parameters ([`CounterUpdate`])
//! - Custom actions ([`CounterAction`](crate::store_actor::CounterAction))

use serde::{Deserialize, Serialize};

use std::fmt::Display;

/// Type-safe key of a stock counter.
///
/// Renders as the classic store keys: `product:<i>`, `warehouse:part:<i>` and
/// `line:<factory>:<line>:part:<i>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CounterKey {
    /// Finished-goods stock of one product.
    Product(usize),
    /// Warehouse stock of one part.
    WarehousePart(usize),
    /// Local stock of one part at one production line.
    LinePart {
        factory: u32,
        line: u32,
        part: usize,
    },
}

impl Display for CounterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CounterKey::Product(i) => write!(f, "product:{}", i),
            CounterKey::WarehousePart(i) => write!(f, "warehouse:part:{}", i),
            CounterKey::LinePart {
                factory,
                line,
                part,
            } => write!(f, "line:{}:{}:part:{}", factory, line, part),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub key: CounterKey,
    pub value: i64,
}

impl Counter {
    pub fn new(key: CounterKey, value: i64) -> Self {
        Self { key, value }
    }
}

/// DTO for seeding (or overwriting) a counter.
#[derive(Debug, Clone)]
pub struct CounterSeed {
    pub key: CounterKey,
    pub value: i64,
}

/// DTO for overwriting a counter that already exists.
///
/// [`StoreClient::set`](crate::clients::StoreClient::set) seeds through
/// [`CounterSeed`] instead, since it must also work on keys that were never set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterUpdate {
    pub value: i64,
}
