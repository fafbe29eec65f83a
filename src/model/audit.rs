//! Append-only audit trails kept next to the counters.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;

/// The audit lists the simulation writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditKey {
    /// Line → Warehouse restock requests.
    Restock,
    /// Customer demand that was served.
    Consumption,
    /// Customer demand that could not be served.
    LostSales,
}

impl AuditKey {
    pub const ALL: [AuditKey; 3] = [AuditKey::Restock, AuditKey::Consumption, AuditKey::LostSales];
}

impl Display for AuditKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AuditKey::Restock => "log:restock_requests",
            AuditKey::Consumption => "log:consumer_consumption",
            AuditKey::LostSales => "log:lost_sales",
        })
    }
}

/// Newest-first list of entries. When `capacity` is set, the oldest entries are
/// dropped once it is exceeded.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLog {
    pub key: AuditKey,
    pub entries: VecDeque<String>,
    pub capacity: Option<usize>,
    /// Entries pushed over the log's lifetime, including dropped ones.
    pub total: u64,
}

impl AuditLog {
    pub fn new(key: AuditKey, capacity: Option<usize>) -> Self {
        Self {
            key,
            entries: VecDeque::new(),
            capacity,
            total: 0,
        }
    }

    pub fn push(&mut self, entry: String) -> usize {
        self.entries.push_front(entry);
        self.total += 1;
        if let Some(cap) = self.capacity {
            self.entries.truncate(cap);
        }
        self.entries.len()
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<String> {
        self.entries.iter().take(n).cloned().collect()
    }
}

/// DTO for creating an audit list.
#[derive(Debug, Clone)]
pub struct AuditLogCreate {
    pub key: AuditKey,
    pub capacity: Option<usize>,
}

/// DTO for changing the retention of an audit list.
#[derive(Debug, Clone)]
pub struct AuditLogUpdate {
    pub capacity: Option<usize>,
}
