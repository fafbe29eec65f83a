//! Initial store state, written before any node starts.

use crate::audit_actor::AuditError;
use crate::clients::NodeContext;
use crate::config::SimConfig;
use crate::model::{AuditKey, CounterKey};
use crate::store_actor::StoreError;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Seeding counters failed: {0}")]
    Store(#[from] StoreError),

    #[error("Creating audit lists failed: {0}")]
    Audit(#[from] AuditError),
}

/// `SET` every product, warehouse and line counter to its configured start value,
/// and create the audit lists with the configured retention.
///
/// Returns the number of counters written.
pub async fn seed_counters(config: &SimConfig, ctx: &NodeContext) -> Result<usize, BootstrapError> {
    let mut written = 0;

    for product in 0..config.catalog.num_products {
        ctx.store
            .set(CounterKey::Product(product), config.seed.product_stock)
            .await?;
        written += 1;
    }
    info!(
        products = config.catalog.num_products,
        value = config.seed.product_stock,
        "Finished-goods stock seeded"
    );

    for part in 0..config.catalog.num_parts {
        ctx.store
            .set(CounterKey::WarehousePart(part), config.seed.warehouse_stock)
            .await?;
        written += 1;
    }
    info!(
        parts = config.catalog.num_parts,
        value = config.seed.warehouse_stock,
        "Warehouse stock seeded"
    );

    for factory in &config.factories {
        for line in 1..=factory.lines {
            for part in 0..config.catalog.num_parts {
                let key = CounterKey::LinePart {
                    factory: factory.id,
                    line,
                    part,
                };
                ctx.store.set(key, config.seed.line_stock).await?;
                written += 1;
            }
        }
    }
    info!(lines = config.line_count(), value = config.seed.line_stock, "Line buffers seeded");

    for key in AuditKey::ALL {
        ctx.audit.create_log(key, config.simulation.audit_capacity).await?;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactoryConfig;
    use crate::factory_actor::Discipline;

    #[tokio::test]
    async fn test_seeds_every_counter() {
        let (ctx, _handles) = NodeContext::in_memory(4);
        let mut config = SimConfig::new();
        config.catalog.num_parts = 50;
        config.factories = vec![FactoryConfig {
            id: 3,
            discipline: Discipline::Push,
            lines: 2,
        }];
        config.seed.line_stock = 7;

        let written = seed_counters(&config, &ctx).await.unwrap();
        assert_eq!(written, 5 + 50 + 2 * 50);

        assert_eq!(ctx.store.quantity(CounterKey::Product(4)).await.unwrap(), 1000);
        assert_eq!(ctx.store.quantity(CounterKey::WarehousePart(49)).await.unwrap(), 48_000);
        let key = CounterKey::LinePart {
            factory: 3,
            line: 2,
            part: 0,
        };
        assert_eq!(ctx.store.quantity(key).await.unwrap(), 7);
        assert_eq!(ctx.store.snapshot().await.unwrap().len(), written);
    }
}
