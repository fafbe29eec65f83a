use super::error::WarehouseError;
use crate::bus::{Channel, LineAddress, Message};
use crate::clients::NodeContext;
use crate::framework::Node;
use crate::model::{CounterKey, KanbanStatus, KanbanThresholds, WaitingFlag};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// The single warehouse. Its stock lives under `warehouse:part:<i>`.
pub struct Warehouse {
    num_parts: usize,
    thresholds: KanbanThresholds,
    shipment_size: i64,
    waiting: WaitingFlag,
}

impl Warehouse {
    /// `shipment_size` is the fixed amount sent per requested part.
    pub fn new(
        num_parts: usize,
        thresholds: KanbanThresholds,
        shipment_size: i64,
        waiting: WaitingFlag,
    ) -> Self {
        Self {
            num_parts,
            thresholds,
            shipment_size,
            waiting,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting.is_waiting()
    }

    /// Ask the supplier for every part that is yellow or red, in one request.
    /// Skipped while an earlier request is still unanswered.
    #[instrument(skip(self, ctx))]
    pub async fn check_and_reorder_from_supplier(
        &mut self,
        day: u32,
        ctx: &NodeContext,
    ) -> Result<Option<Vec<bool>>, WarehouseError> {
        if self.waiting.blocks(day) {
            debug!("Waiting for supplier, check skipped");
            return Ok(None);
        }

        let mut flags = vec![false; self.num_parts];
        for (part, flag) in flags.iter_mut().enumerate() {
            let stock = ctx.store.quantity(CounterKey::WarehousePart(part)).await?;
            *flag = self.thresholds.classify(stock).needs_replenishment();
        }

        if !flags.iter().any(|&f| f) {
            info!(status = %KanbanStatus::Green, "Stock level checked");
            return Ok(None);
        }

        self.waiting.raise(day);
        ctx.bus.publish(&Message::SupplierRequest {
            flags: flags.clone(),
        });
        info!(parts = flags.iter().filter(|&&f| f).count(), "Stock low, supplier order sent");
        Ok(Some(flags))
    }

    /// Ship the fixed amount of every flagged part to `line`.
    ///
    /// All or nothing: if one flagged part is short, nothing is decremented and
    /// nothing is sent.
    #[instrument(skip(self, flags, ctx), fields(line = %line))]
    pub async fn serve_line(
        &mut self,
        line: LineAddress,
        flags: &[bool],
        ctx: &NodeContext,
    ) -> Result<Vec<i64>, WarehouseError> {
        let mut shipment = vec![0; self.num_parts];
        for (part, _) in flags.iter().enumerate().filter(|&(_, &f)| f) {
            if part >= self.num_parts {
                return Err(WarehouseError::UnknownPart {
                    part,
                    num_parts: self.num_parts,
                });
            }
            let available = ctx.store.quantity(CounterKey::WarehousePart(part)).await?;
            if available < self.shipment_size {
                return Err(WarehouseError::Stockout {
                    line,
                    part,
                    required: self.shipment_size,
                    available,
                });
            }
            shipment[part] = self.shipment_size;
        }

        let keys: Vec<CounterKey> = shipment
            .iter()
            .enumerate()
            .filter(|&(_, &amount)| amount > 0)
            .map(|(part, _)| CounterKey::WarehousePart(part))
            .collect();
        ctx.store.decrement_all(&keys, self.shipment_size).await?;

        ctx.bus.publish(&Message::LineShipment {
            to: line,
            parts: shipment.clone(),
        });
        info!("Parts shipped");
        Ok(shipment)
    }

    /// Add a supplier shipment to stock and clear the waiting flag.
    #[instrument(skip(self, parts, ctx))]
    pub async fn receive_parts(&mut self, parts: &[i64], ctx: &NodeContext) -> Result<(), WarehouseError> {
        for (part, &amount) in parts.iter().enumerate() {
            if amount > 0 {
                ctx.store.increment(CounterKey::WarehousePart(part), amount).await?;
            }
        }
        self.waiting.clear();
        info!("Stock replenished by supplier");
        Ok(())
    }
}

#[async_trait]
impl Node for Warehouse {
    type Context = NodeContext;
    type Error = WarehouseError;

    fn name(&self) -> String {
        "warehouse".to_string()
    }

    fn channel(&self) -> Channel {
        Channel::Warehouse
    }

    async fn handle_message(&mut self, message: Message, ctx: &NodeContext) -> Result<(), WarehouseError> {
        match message {
            Message::SupplierShipment { parts } => self.receive_parts(&parts, ctx).await,
            Message::PartsRequest { from, flags } => {
                self.serve_line(from, &flags, ctx).await.map(|_| ())
            }
            _ => Ok(()),
        }
    }

    async fn on_day(&mut self, day: u32, ctx: &NodeContext) -> Result<(), WarehouseError> {
        self.check_and_reorder_from_supplier(day, ctx).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::clients::StoreClient;
    use crate::framework::{mock::MockClient, FrameworkError};
    use crate::model::Counter;
    use crate::store_actor::{CounterActionResult, StoreError};

    fn warehouse(num_parts: usize) -> Warehouse {
        Warehouse::new(
            num_parts,
            KanbanThresholds::new(150, 300),
            1440,
            WaitingFlag::new(None),
        )
    }

    #[tokio::test]
    async fn test_low_part_is_reordered_and_latch_clears_on_delivery() {
        let (ctx, _handles) = NodeContext::in_memory(16);
        let mut supplier = ctx.bus.subscribe(Channel::Supplier);
        let mut wh = warehouse(10);
        for part in 0..10 {
            ctx.store.set(CounterKey::WarehousePart(part), 1000).await.unwrap();
        }
        ctx.store.set(CounterKey::WarehousePart(7), 100).await.unwrap();

        let flags = wh.check_and_reorder_from_supplier(0, &ctx).await.unwrap().unwrap();
        assert_eq!(flags.iter().position(|&f| f), Some(7));
        assert_eq!(supplier.recv().await.unwrap(), "send_parts/0;0;0;0;0;0;0;1;0;0");
        assert!(wh.is_waiting());
        assert_eq!(wh.check_and_reorder_from_supplier(1, &ctx).await.unwrap(), None);

        let mut shipment = vec![0; 10];
        shipment[7] = 93_600;
        wh.handle_message(Message::SupplierShipment { parts: shipment }, &ctx)
            .await
            .unwrap();
        assert_eq!(
            ctx.store.quantity(CounterKey::WarehousePart(7)).await.unwrap(),
            93_700
        );
        assert!(!wh.is_waiting());
    }

    #[tokio::test]
    async fn test_shipment_is_all_or_nothing() {
        let (ctx, _handles) = NodeContext::in_memory(16);
        let mut lines = ctx.bus.subscribe(Channel::Line);
        let mut wh = warehouse(4);
        ctx.store.set(CounterKey::WarehousePart(0), 5000).await.unwrap();
        ctx.store.set(CounterKey::WarehousePart(2), 1000).await.unwrap();
        let requester = LineAddress::new(3, 2);

        let err = wh
            .serve_line(requester, &[true, false, true, false], &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, WarehouseError::Stockout { part: 2, available: 1000, .. }));
        assert_eq!(ctx.store.quantity(CounterKey::WarehousePart(0)).await.unwrap(), 5000);
        assert!(lines.try_recv().is_err());

        ctx.store.set(CounterKey::WarehousePart(2), 1440).await.unwrap();
        let shipped = wh
            .serve_line(requester, &[true, false, true, false], &ctx)
            .await
            .unwrap();
        assert_eq!(shipped, vec![1440, 0, 1440, 0]);
        assert_eq!(ctx.store.quantity(CounterKey::WarehousePart(0)).await.unwrap(), 3560);
        assert_eq!(ctx.store.quantity(CounterKey::WarehousePart(2)).await.unwrap(), 0);
        assert_eq!(lines.recv().await.unwrap(), "receive_parts/3/2/1440;0;1440;0");
    }

    #[tokio::test]
    async fn test_request_for_unknown_part_is_rejected() {
        let (ctx, _handles) = NodeContext::in_memory(16);
        let mut wh = warehouse(2);
        let err = wh
            .serve_line(LineAddress::new(1, 1), &[false, false, true], &ctx)
            .await
            .unwrap_err();
        assert_eq!(err, WarehouseError::UnknownPart { part: 2, num_parts: 2 });
    }

    #[tokio::test]
    async fn test_failed_shipment_restores_warehouse_stock() {
        let mut store_mock = MockClient::<Counter>::new();
        for part in [0, 2] {
            store_mock
                .expect_get(CounterKey::WarehousePart(part))
                .return_ok(Some(Counter::new(CounterKey::WarehousePart(part), 5000)));
        }
        store_mock
            .expect_action(CounterKey::WarehousePart(0))
            .return_ok(CounterActionResult::Decrement(3560));
        store_mock
            .expect_action(CounterKey::WarehousePart(2))
            .return_err(FrameworkError::ActorDropped);
        store_mock
            .expect_action(CounterKey::WarehousePart(0))
            .return_ok(CounterActionResult::Increment(5000));

        let (_audit_actor, audit) = crate::audit_actor::new();
        let bus = Bus::new(8);
        let mut lines = bus.subscribe(Channel::Line);
        let ctx = NodeContext::new(StoreClient::new(store_mock.client()), audit, bus);

        let mut wh = warehouse(4);
        let result = wh
            .serve_line(LineAddress::new(3, 2), &[true, false, true, false], &ctx)
            .await;
        assert!(matches!(
            result,
            Err(WarehouseError::Store(StoreError::ActorCommunicationError(_)))
        ));
        store_mock.verify();
        assert!(lines.try_recv().is_err());
    }
}

