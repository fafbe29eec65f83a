use kanban_supply_chain::config::SimConfig;
use kanban_supply_chain::lifecycle::{SupplyChainSystem, SystemError};
use kanban_supply_chain::model::{AuditKey, CounterKey};
use std::io::Write;

fn short_run(days: u32) -> SimConfig {
    let mut config = SimConfig::new();
    config.simulation.days = days;
    config.simulation.day_length_ms = 50;
    config.simulation.drain_grace_ms = 500;
    config.demand.seed = Some(7);
    config
}

/// Full end-to-end run with every real actor.
#[tokio::test]
async fn test_full_supply_chain_run() {
    let system = SupplyChainSystem::start(short_run(4))
        .await
        .expect("Failed to start system");

    let report = system
        .run_to_completion()
        .await
        .expect("Simulation failed");

    assert_eq!(report.days, 4);
    assert_eq!(report.product_stock.len(), 5);
    assert_eq!(report.warehouse_stock.len(), 100);
    assert!(report.product_stock.iter().all(|&s| s >= 0));
    assert!(report.warehouse_stock.iter().all(|&s| s >= 0));

    // Every line starts empty, so every line asks for parts on its first day
    assert!(report.restock_requests >= 13);

    // Five products a day, each either served or lost
    assert_eq!(report.consumption_events + report.lost_sales, 5 * 4);
}

/// Stopping before the first day leaves the seeded state untouched.
#[tokio::test]
async fn test_shutdown_before_first_day_reports_seeded_state() {
    let mut config = short_run(20);
    config.simulation.day_length_ms = 60_000;

    let system = SupplyChainSystem::start(config).await.unwrap();

    assert_eq!(
        system.context.store.quantity(CounterKey::Product(2)).await.unwrap(),
        1000
    );
    assert_eq!(system.context.audit.len(AuditKey::Restock).await.unwrap(), 0);

    let report = system.shutdown().await.unwrap();
    assert_eq!(report.product_stock, vec![1000; 5]);
    assert_eq!(report.warehouse_stock, vec![48_000; 100]);
    assert_eq!(report.restock_requests, 0);
    assert_eq!(report.lost_sales, 0);
}

#[tokio::test]
async fn test_start_rejects_invalid_config() {
    let mut config = short_run(1);
    config.demand.min = 500;
    assert!(matches!(
        SupplyChainSystem::start(config).await,
        Err(SystemError::Config(_))
    ));
}

#[tokio::test]
async fn test_catalog_file_must_match_product_count() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "44;45").unwrap();
    writeln!(file, "46;47").unwrap();

    let mut config = short_run(1);
    config.catalog.bom_path = Some(file.path().to_path_buf());
    assert!(matches!(
        SupplyChainSystem::start(config.clone()).await,
        Err(SystemError::Config(_))
    ));

    config.catalog.num_products = 2;
    config.simulation.day_length_ms = 60_000;
    let system = SupplyChainSystem::start(config).await.unwrap();
    let report = system.shutdown().await.unwrap();
    assert_eq!(report.product_stock, vec![1000, 1000]);
}
