use kanban_supply_chain::bus::{Bus, Channel, LineAddress, Message};
use kanban_supply_chain::clients::{NodeContext, StoreClient};
use kanban_supply_chain::framework::{mock::MockClient, FrameworkError, NodeActor, Schedule};
use kanban_supply_chain::line_actor::{LineError, ProductionLine};
use kanban_supply_chain::model::{BillOfMaterials, Counter, CounterKey, KanbanThresholds, WaitingFlag};
use kanban_supply_chain::store_actor::{CounterActionResult, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

fn part(part: usize) -> CounterKey {
    CounterKey::LinePart {
        factory: 2,
        line: 4,
        part,
    }
}

/// Integration test: real line node driven over the bus, with a mocked store.
///
/// - Real `NodeActor` + `ProductionLine` (decoding, addressing, check-then-consume)
/// - Mocked store client (asserts exactly which counters are read and written)
#[tokio::test]
async fn test_line_node_with_mocked_store() {
    // Base kit of 1 part, product 0 adds part 2 (1-based)
    let bom = Arc::new(BillOfMaterials::parse("2", 1, 3).unwrap());

    let mut store_mock = MockClient::<Counter>::new();
    // Check phase reads every required part
    store_mock
        .expect_get(part(0))
        .return_ok(Some(Counter::new(part(0), 10)));
    store_mock
        .expect_get(part(1))
        .return_ok(Some(Counter::new(part(1), 25)));
    // Consume phase decrements them, base kit first
    store_mock
        .expect_action(part(0))
        .return_ok(CounterActionResult::Decrement(0));
    store_mock
        .expect_action(part(1))
        .return_ok(CounterActionResult::Decrement(15));

    let (audit_actor, audit) = kanban_supply_chain::audit_actor::new();
    let audit_handle = tokio::spawn(audit_actor.run(()));
    let bus = Bus::new(16);
    let ctx = NodeContext::new(StoreClient::new(store_mock.client()), audit, bus.clone());

    let line = ProductionLine::new(
        LineAddress::new(4, 2),
        bom,
        KanbanThresholds::new(144, 288),
        WaitingFlag::new(None),
    );
    // No daily checks: only the order below may touch the store
    let schedule = Schedule::new(Duration::from_secs(60), 0);
    let (stop, signal) = watch::channel(false);
    let actor = NodeActor::new(line, &bus, schedule, signal);
    let mut finished_goods = bus.subscribe(Channel::ProductStock);
    let handle = tokio::spawn(actor.run(ctx));

    // Addressed to another line: ignored
    bus.publish(&Message::ProductionOrder {
        to: LineAddress::new(4, 1),
        product: 0,
        quantity: 10,
    });
    bus.publish(&Message::ProductionOrder {
        to: LineAddress::new(4, 2),
        product: 0,
        quantity: 10,
    });

    let produced = tokio::time::timeout(Duration::from_secs(5), finished_goods.recv())
        .await
        .expect("No production report")
        .unwrap();
    assert_eq!(produced, "receive_products/0/4/2/10");

    stop.send(true).unwrap();
    let line = handle.await.unwrap();
    assert!(!line.is_waiting());

    store_mock.verify();

    // The node dropped its context on exit, so the audit actor stops too
    audit_handle.await.unwrap();
}

/// A store failure midway through consumption hands back the parts already taken.
#[tokio::test]
async fn test_failed_consumption_restores_consumed_parts() {
    let bom = Arc::new(BillOfMaterials::parse("2", 1, 3).unwrap());

    let mut store_mock = MockClient::<Counter>::new();
    // Check phase passes
    store_mock
        .expect_get(part(0))
        .return_ok(Some(Counter::new(part(0), 10)));
    store_mock
        .expect_get(part(1))
        .return_ok(Some(Counter::new(part(1), 10)));
    // Base kit part is consumed, then the variant part fails
    store_mock
        .expect_action(part(0))
        .return_ok(CounterActionResult::Decrement(0));
    store_mock
        .expect_action(part(1))
        .return_err(FrameworkError::ActorDropped);
    // The base kit part is put back
    store_mock
        .expect_action(part(0))
        .return_ok(CounterActionResult::Increment(10));

    let (_audit_actor, audit) = kanban_supply_chain::audit_actor::new();
    let bus = Bus::new(16);
    let mut finished_goods = bus.subscribe(Channel::ProductStock);
    let ctx = NodeContext::new(StoreClient::new(store_mock.client()), audit, bus);

    let mut line = ProductionLine::new(
        LineAddress::new(4, 2),
        bom,
        KanbanThresholds::new(144, 288),
        WaitingFlag::new(None),
    );

    let result = line.execute_order(0, 10, &ctx).await;
    assert!(matches!(
        result,
        Err(LineError::Store(StoreError::ActorCommunicationError(_)))
    ));
    store_mock.verify();
    // Nothing was reported as produced
    assert!(finished_goods.try_recv().is_err());
}

