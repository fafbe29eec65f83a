use tracing::warn;

/// Latch that is raised when a replenishment request goes out and cleared when the
/// shipment arrives. While raised, the owner does not reorder.
///
/// Without a timeout a lost request or shipment keeps the latch raised for the rest
/// of the run. With `timeout_days`, a latch older than that many days is re-armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaitingFlag {
    requested_on: Option<u32>,
    timeout_days: Option<u32>,
}

impl WaitingFlag {
    pub fn new(timeout_days: Option<u32>) -> Self {
        Self {
            requested_on: None,
            timeout_days,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.requested_on.is_some()
    }

    pub fn raise(&mut self, day: u32) {
        self.requested_on = Some(day);
    }

    pub fn clear(&mut self) {
        self.requested_on = None;
    }

    /// Whether the reorder check for `day` must be skipped.
    pub fn blocks(&mut self, day: u32) -> bool {
        let Some(since) = self.requested_on else {
            return false;
        };
        match self.timeout_days {
            Some(timeout) if day.saturating_sub(since) >= timeout => {
                warn!(since, day, "Replenishment never arrived, re-arming");
                self.requested_on = None;
                false
            }
            _ => true,
        }
    }
}
