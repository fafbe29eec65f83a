//! [`Node`] implementation for [`ProductionLine`].

use super::error::LineError;
use crate::bus::codec::encode_flags;
use crate::bus::{Channel, LineAddress, Message};
use crate::clients::NodeContext;
use crate::framework::Node;
use crate::model::{AuditKey, BillOfMaterials, CounterKey, KanbanStatus, KanbanThresholds, WaitingFlag};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// One production line of one factory.
///
/// The line's part counters live in the shared store under
/// `line:<factory>:<line>:part:<i>` and are only mutated by this line.
pub struct ProductionLine {
    address: LineAddress,
    bom: Arc<BillOfMaterials>,
    thresholds: KanbanThresholds,
    waiting: WaitingFlag,
    last_status: Option<KanbanStatus>,
}

impl ProductionLine {
    /// `thresholds` applies to every part of the buffer.
    pub fn new(
        address: LineAddress,
        bom: Arc<BillOfMaterials>,
        thresholds: KanbanThresholds,
        waiting: WaitingFlag,
    ) -> Self {
        Self {
            address,
            bom,
            thresholds,
            waiting,
            last_status: None,
        }
    }

    pub fn address(&self) -> LineAddress {
        self.address
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting.is_waiting()
    }

    /// Worst part status seen by the latest check.
    pub fn last_status(&self) -> Option<KanbanStatus> {
        self.last_status
    }

    fn part_key(&self, part: usize) -> CounterKey {
        CounterKey::LinePart {
            factory: self.address.factory,
            line: self.address.line,
            part,
        }
    }

    /// Classify every part of the buffer and, if any is yellow or red, ask the
    /// warehouse for all of them at once. Returns the flags that were requested.
    ///
    /// Skipped while an earlier request is still unanswered.
    #[instrument(skip(self, ctx), fields(line = %self.address))]
    pub async fn check_and_reorder(
        &mut self,
        day: u32,
        ctx: &NodeContext,
    ) -> Result<Option<Vec<bool>>, LineError> {
        if self.waiting.blocks(day) {
            debug!("Waiting for parts, check skipped");
            return Ok(None);
        }

        let mut flags = vec![false; self.bom.num_parts()];
        let mut worst = KanbanStatus::Green;
        for (part, flag) in flags.iter_mut().enumerate() {
            let stock = ctx.store.quantity(self.part_key(part)).await?;
            let status = self.thresholds.classify(stock);
            *flag = status.needs_replenishment();
            worst = worst.max(status);
        }
        self.last_status = Some(worst);
        info!(status = %worst, "Parts buffer checked");

        if !flags.iter().any(|&f| f) {
            return Ok(None);
        }

        self.waiting.raise(day);
        let request = Message::PartsRequest {
            from: self.address,
            flags: flags.clone(),
        };
        ctx.bus.publish(&request);
        ctx.audit
            .push(
                AuditKey::Restock,
                format!(
                    "Line {}-{} requested parts: {}",
                    self.address.line,
                    self.address.factory,
                    encode_flags(&flags)
                ),
            )
            .await?;
        info!(parts = flags.iter().filter(|&&f| f).count(), "Parts requested");
        Ok(Some(flags))
    }

    /// Build `quantity` units of `product`.
    ///
    /// Every required part is checked before anything is consumed, so a shortage
    /// leaves the buffer untouched.
    #[instrument(skip(self, ctx), fields(line = %self.address))]
    pub async fn execute_order(
        &mut self,
        product: usize,
        quantity: i64,
        ctx: &NodeContext,
    ) -> Result<(), LineError> {
        let required = self
            .bom
            .requirements(product)
            .ok_or(LineError::UnknownProduct(product))?;
        if quantity <= 0 {
            return Err(LineError::InvalidQuantity(quantity));
        }

        for &part in &required {
            let available = ctx.store.quantity(self.part_key(part)).await?;
            if available < quantity {
                return Err(LineError::LineBreak {
                    line: self.address,
                    part,
                    required: quantity,
                    available,
                });
            }
        }

        let keys: Vec<CounterKey> = required.iter().map(|&part| self.part_key(part)).collect();
        ctx.store.decrement_all(&keys, quantity).await?;

        ctx.bus.publish(&Message::ProductsDelivered {
            product,
            from: self.address,
            quantity,
        });
        info!(product, quantity, "Production order completed");
        Ok(())
    }

    /// Add a warehouse shipment to the buffer and clear the waiting flag.
    ///
    /// Shipments are not deduplicated: the same shipment twice adds twice.
    #[instrument(skip(self, parts, ctx), fields(line = %self.address))]
    pub async fn receive_parts(&mut self, parts: &[i64], ctx: &NodeContext) -> Result<(), LineError> {
        for (part, &amount) in parts.iter().enumerate() {
            if amount > 0 {
                ctx.store.increment(self.part_key(part), amount).await?;
            }
        }
        self.waiting.clear();
        info!("Parts buffer replenished");
        Ok(())
    }
}

#[async_trait]
impl Node for ProductionLine {
    type Context = NodeContext;
    type Error = LineError;

    fn name(&self) -> String {
        self.address.to_string()
    }

    fn channel(&self) -> Channel {
        Channel::Line
    }

    async fn handle_message(&mut self, message: Message, ctx: &NodeContext) -> Result<(), LineError> {
        if message.recipient() != Some(self.address) {
            return Ok(());
        }
        match message {
            Message::ProductionOrder {
                product, quantity, ..
            } => self.execute_order(product, quantity, ctx).await,
            Message::LineShipment { parts, .. } => self.receive_parts(&parts, ctx).await,
            _ => Ok(()),
        }
    }

    async fn on_day(&mut self, day: u32, ctx: &NodeContext) -> Result<(), LineError> {
        self.check_and_reorder(day, ctx).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUM_PARTS: usize = 46;

    fn new_line(bom: Arc<BillOfMaterials>) -> ProductionLine {
        ProductionLine::new(
            LineAddress::new(1, 1),
            bom,
            KanbanThresholds::new(144, 288),
            WaitingFlag::new(None),
        )
    }

    fn bom() -> Arc<BillOfMaterials> {
        // Product 0 uses variants 44 and 45 (1-based)
        Arc::new(BillOfMaterials::parse("44;45\n46", 43, NUM_PARTS).unwrap())
    }

    async fn fill(ctx: &NodeContext, line: &ProductionLine, amount: i64) {
        for part in 0..NUM_PARTS {
            ctx.store.set(line.part_key(part), amount).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_execute_order_consumes_every_required_part() {
        let (ctx, _handles) = NodeContext::in_memory(16);
        let mut products = ctx.bus.subscribe(Channel::ProductStock);
        let mut line = new_line(bom());
        fill(&ctx, &line, 10).await;

        line.execute_order(0, 10, &ctx).await.unwrap();

        for part in 0..45 {
            assert_eq!(ctx.store.quantity(line.part_key(part)).await.unwrap(), 0);
        }
        // Part 45 (0-based) belongs to product 1 only
        assert_eq!(ctx.store.quantity(line.part_key(45)).await.unwrap(), 10);
        assert_eq!(products.recv().await.unwrap(), "receive_products/0/1/1/10");
        assert!(products.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_line_break_leaves_buffer_untouched() {
        let (ctx, _handles) = NodeContext::in_memory(16);
        let mut products = ctx.bus.subscribe(Channel::ProductStock);
        let mut line = new_line(bom());
        fill(&ctx, &line, 10).await;
        ctx.store.set(line.part_key(44), 9).await.unwrap();

        let err = line.execute_order(0, 10, &ctx).await.unwrap_err();
        assert_eq!(
            err,
            LineError::LineBreak {
                line: LineAddress::new(1, 1),
                part: 44,
                required: 10,
                available: 9
            }
        );
        assert_eq!(ctx.store.quantity(line.part_key(0)).await.unwrap(), 10);
        assert!(products.try_recv().is_err());

        assert_eq!(
            line.execute_order(7, 1, &ctx).await,
            Err(LineError::UnknownProduct(7))
        );
    }

    #[tokio::test]
    async fn test_reorder_latches_until_parts_arrive() {
        let (ctx, _handles) = NodeContext::in_memory(16);
        let mut warehouse = ctx.bus.subscribe(Channel::Warehouse);
        let mut line = new_line(bom());
        fill(&ctx, &line, 1000).await;
        ctx.store.set(line.part_key(2), 200).await.unwrap();
        ctx.store.set(line.part_key(5), 100).await.unwrap();

        let flags = line.check_and_reorder(0, &ctx).await.unwrap().unwrap();
        assert_eq!(flags.iter().filter(|&&f| f).count(), 2);
        assert!(flags[2] && flags[5]);
        assert_eq!(line.last_status(), Some(KanbanStatus::Red));
        assert!(line.is_waiting());

        let frame = warehouse.recv().await.unwrap();
        assert!(frame.starts_with("1/1/send_parts/0;0;1;0;0;1;0"));
        assert_eq!(ctx.audit.len(AuditKey::Restock).await.unwrap(), 1);

        // Latched: no second request
        assert_eq!(line.check_and_reorder(1, &ctx).await.unwrap(), None);
        assert!(warehouse.try_recv().is_err());

        let mut shipment = vec![0; NUM_PARTS];
        shipment[2] = 1440;
        shipment[5] = 1440;
        line.receive_parts(&shipment, &ctx).await.unwrap();
        assert!(!line.is_waiting());
        assert_eq!(ctx.store.quantity(line.part_key(5)).await.unwrap(), 1540);

        assert_eq!(line.check_and_reorder(2, &ctx).await.unwrap(), None);
        assert_eq!(line.last_status(), Some(KanbanStatus::Green));
    }

    #[tokio::test]
    async fn test_messages_for_other_lines_are_ignored() {
        let (ctx, _handles) = NodeContext::in_memory(16);
        let mut line = new_line(bom());

        let elsewhere = Message::LineShipment {
            to: LineAddress::new(1, 2),
            parts: vec![5; NUM_PARTS],
        };
        line.handle_message(elsewhere, &ctx).await.unwrap();
        assert_eq!(ctx.store.quantity(line.part_key(0)).await.unwrap(), 0);

        let mine = Message::LineShipment {
            to: LineAddress::new(1, 1),
            parts: vec![5; NUM_PARTS],
        };
        line.handle_message(mine.clone(), &ctx).await.unwrap();
        line.handle_message(mine, &ctx).await.unwrap();
        assert_eq!(ctx.store.quantity(line.part_key(0)).await.unwrap(), 10);
    }
}
