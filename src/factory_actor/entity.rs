use super::error::FactoryError;
use crate::bus::{Channel, LineAddress, Message};
use crate::clients::NodeContext;
use crate::framework::Node;
use crate::model::{KanbanStatus, KanbanThresholds};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use tracing::{debug, info, instrument};

/// How a factory sizes its daily batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    /// Always the nominal batch.
    Push,
    /// Half, nominal or double batch for green, yellow or red finished-goods stock.
    Pull,
}

impl Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Discipline::Push => "push",
            Discipline::Pull => "pull",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FactoryState {
    /// No stock status received yet; daily ordering is skipped.
    AwaitingFirstStatus,
    Ready { status: KanbanStatus },
}

pub struct Factory {
    id: u32,
    discipline: Discipline,
    lines: u32,
    num_products: usize,
    batch_size: i64,
    thresholds: KanbanThresholds,
    state: FactoryState,
    /// Product indices ranked by ascending stock. Only kept when the factory has
    /// more lines than products.
    priority: Vec<usize>,
}

impl Factory {
    /// Finished-goods thresholds scale with the line count: red below
    /// `product_red_alert × lines`, yellow below twice that.
    pub fn new(
        id: u32,
        discipline: Discipline,
        lines: u32,
        num_products: usize,
        batch_size: i64,
        product_red_alert: i64,
    ) -> Self {
        let red = product_red_alert.saturating_mul(i64::from(lines));
        Self {
            id,
            discipline,
            lines,
            num_products,
            batch_size,
            thresholds: KanbanThresholds::new(red, red.saturating_mul(2)),
            state: FactoryState::AwaitingFirstStatus,
            priority: Vec::new(),
        }
    }

    pub fn state(&self) -> &FactoryState {
        &self.state
    }

    pub fn priority(&self) -> &[usize] {
        &self.priority
    }

    /// Classify the total finished-goods stock and refresh the priority list.
    #[instrument(skip(self, stock), fields(factory = self.id))]
    pub fn update_stock_status(&mut self, stock: &[i64]) -> Result<KanbanStatus, FactoryError> {
        if stock.len() != self.num_products {
            return Err(FactoryError::StockVectorLength {
                expected: self.num_products,
                got: stock.len(),
            });
        }

        let total = stock.iter().fold(0i64, |acc, &s| acc.saturating_add(s));
        let status = self.thresholds.classify(total);
        self.state = FactoryState::Ready { status };

        if self.lines as usize > self.num_products {
            let mut ranked: Vec<usize> = (0..stock.len()).collect();
            // Stable: ties keep product order
            ranked.sort_by_key(|&p| stock[p]);
            self.priority = ranked;
            debug!(priority = ?self.priority, "Production priority updated");
        }

        info!(total, %status, "Finished-goods status received");
        Ok(status)
    }

    /// Today's batch, or `None` while no status has arrived.
    pub fn batch_size(&self) -> Option<i64> {
        let FactoryState::Ready { status } = self.state else {
            return None;
        };
        Some(match (self.discipline, status) {
            (Discipline::Push, _) => self.batch_size,
            (Discipline::Pull, KanbanStatus::Green) => self.batch_size / 2,
            (Discipline::Pull, KanbanStatus::Yellow) => self.batch_size,
            (Discipline::Pull, KanbanStatus::Red) => self.batch_size.saturating_mul(2),
        })
    }

    /// Lines `0..num_products` each build their own product. Extra lines walk the
    /// priority list, wrapping around, or fall back to product 0 without one.
    pub fn product_for_line(&self, line_idx: usize) -> usize {
        if line_idx < self.num_products {
            return line_idx;
        }
        if self.priority.is_empty() {
            return 0;
        }
        self.priority[(line_idx - self.num_products) % self.priority.len()]
    }

    /// One production order per line. Nothing is sent while awaiting the first status.
    #[instrument(skip(self, ctx), fields(factory = self.id))]
    pub fn order_daily_batch(&self, ctx: &NodeContext) -> Vec<Message> {
        let Some(quantity) = self.batch_size() else {
            info!("Awaiting first stock status, no orders today");
            return Vec::new();
        };

        let orders: Vec<Message> = (0..self.lines as usize)
            .map(|idx| Message::ProductionOrder {
                to: LineAddress::new(idx as u32 + 1, self.id),
                product: self.product_for_line(idx),
                quantity,
            })
            .collect();
        for order in &orders {
            ctx.bus.publish(order);
        }
        info!(quantity, lines = self.lines, "Daily production orders sent");
        orders
    }
}

#[async_trait]
impl Node for Factory {
    type Context = NodeContext;
    type Error = FactoryError;

    fn name(&self) -> String {
        format!("factory-{}-{}", self.id, self.discipline)
    }

    fn channel(&self) -> Channel {
        Channel::Factory
    }

    async fn handle_message(&mut self, message: Message, _ctx: &NodeContext) -> Result<(), FactoryError> {
        if let Message::StockStatus { stock } = message {
            self.update_stock_status(&stock)?;
        }
        Ok(())
    }

    async fn on_day(&mut self, _day: u32, ctx: &NodeContext) -> Result<(), FactoryError> {
        self.order_daily_batch(ctx);
        Ok(())
    }
}
