use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Traffic-light status of a stock level. Ordered from healthy to critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KanbanStatus {
    Green,
    Yellow,
    Red,
}

impl KanbanStatus {
    /// Yellow and red both trigger a reorder.
    pub fn needs_replenishment(self) -> bool {
        self != KanbanStatus::Green
    }
}

impl Display for KanbanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KanbanStatus::Green => "GREEN",
            KanbanStatus::Yellow => "YELLOW",
            KanbanStatus::Red => "RED",
        })
    }
}

/// The two alert levels a stock is classified against. `red` should not exceed `yellow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanbanThresholds {
    pub red: i64,
    pub yellow: i64,
}

impl KanbanThresholds {
    pub fn new(red: i64, yellow: i64) -> Self {
        Self { red, yellow }
    }

    /// Red below `red`, yellow below `yellow`, green otherwise.
    /// A quantity sitting exactly on a threshold belongs to the healthier side.
    pub fn classify(&self, quantity: i64) -> KanbanStatus {
        if quantity < self.red {
            KanbanStatus::Red
        } else if quantity < self.yellow {
            KanbanStatus::Yellow
        } else {
            KanbanStatus::Green
        }
    }
}
