use crate::audit_actor::AuditError;
use crate::bus::LineAddress;
use crate::clients::NodeContext;
use crate::config::{ConfigError, SimConfig};
use crate::factory_actor::Factory;
use crate::framework::{Node, NodeActor, Schedule};
use crate::line_actor::ProductionLine;
use crate::lifecycle::bootstrap::{seed_counters, BootstrapError};
use crate::model::{AuditKey, BillOfMaterials, BomError, CounterKey};
use crate::product_stock_actor::ProductStock;
use crate::store_actor::StoreError;
use crate::supplier_actor::Supplier;
use crate::warehouse_actor::Warehouse;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] BomError),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(StoreError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("Report failed: {0}")]
    Report(String),

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl From<StoreError> for SystemError {
    fn from(e: StoreError) -> Self {
        SystemError::Report(e.to_string())
    }
}

impl From<AuditError> for SystemError {
    fn from(e: AuditError) -> Self {
        SystemError::Report(e.to_string())
    }
}

/// End-of-run state of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub days: u32,
    pub product_stock: Vec<i64>,
    pub warehouse_stock: Vec<i64>,
    pub restock_requests: u64,
    pub consumption_events: u64,
    pub lost_sales: u64,
}

impl SimulationReport {
    async fn collect(config: &SimConfig, ctx: &NodeContext) -> Result<Self, SystemError> {
        let snapshot = ctx.store.snapshot().await?;
        let value = |key: CounterKey| snapshot.get(&key).copied().unwrap_or(0);
        Ok(Self {
            days: config.simulation.days,
            product_stock: (0..config.catalog.num_products)
                .map(|p| value(CounterKey::Product(p)))
                .collect(),
            warehouse_stock: (0..config.catalog.num_parts)
                .map(|p| value(CounterKey::WarehousePart(p)))
                .collect(),
            restock_requests: ctx.audit.len(AuditKey::Restock).await?,
            consumption_events: ctx.audit.len(AuditKey::Consumption).await?,
            lost_sales: ctx.audit.len(AuditKey::LostSales).await?,
        })
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation finished after {} days", self.days)?;
        writeln!(f, "  finished goods:   {:?}", self.product_stock)?;
        writeln!(
            f,
            "  warehouse parts:  min {} / max {}",
            self.warehouse_stock.iter().min().copied().unwrap_or(0),
            self.warehouse_stock.iter().max().copied().unwrap_or(0)
        )?;
        writeln!(f, "  restock requests: {}", self.restock_requests)?;
        writeln!(f, "  sales served:     {}", self.consumption_events)?;
        write!(f, "  lost sales:       {}", self.lost_sales)
    }
}

/// The runtime orchestrator of the supply chain.
///
/// `SupplyChainSystem` is responsible for:
/// - **Lifecycle Management**: starting the store, every node, and stopping them
/// - **Dependency Wiring**: handing each node the shared [`NodeContext`]
/// - **Bootstrap**: seeding the counters before the first day
///
/// # Example
///
/// ```ignore
/// let system = SupplyChainSystem::start(SimConfig::new()).await?;
/// let report = system.run_to_completion().await?;
/// println!("{}", report);
/// ```
pub struct SupplyChainSystem {
    /// Shared store, audit lists and bus
    pub context: NodeContext,

    config: SimConfig,

    /// Flipped to `true` to stop every node
    shutdown: watch::Sender<bool>,

    /// Node task handles
    nodes: Vec<JoinHandle<()>>,

    /// Store and audit actor handles
    store_handles: Vec<JoinHandle<()>>,
}

impl SupplyChainSystem {
    /// Validates `config`, starts the store, seeds it, and spawns every node.
    ///
    /// Each node subscribes to its channel before any node is spawned, so no frame
    /// from the first day can be missed.
    pub async fn start(config: SimConfig) -> Result<Self, SystemError> {
        config.validate()?;

        let bom = match &config.catalog.bom_path {
            Some(path) => BillOfMaterials::load(
                path,
                config.catalog.base_kit_size,
                config.catalog.num_parts,
            )?,
            None => BillOfMaterials::generated(
                config.catalog.num_products,
                config.catalog.base_kit_size,
                config.catalog.num_parts,
            )?,
        };
        if bom.product_count() != config.catalog.num_products {
            return Err(ConfigError::Invalid(format!(
                "bill of materials lists {} products, catalog.num_products is {}",
                bom.product_count(),
                config.catalog.num_products
            ))
            .into());
        }
        let bom = Arc::new(bom);

        // 1. Store and audit actors
        let (context, store_handles) = NodeContext::in_memory(config.simulation.bus_capacity);
        if let Err(e) = context.store.ping().await {
            error!(error = %e, "Store unreachable");
            return Err(SystemError::StoreUnavailable(e));
        }

        // 2. Initial state
        let written = seed_counters(&config, &context).await?;
        info!(counters = written, "Store seeded");

        // 3. Nodes
        let schedule = Schedule::new(config.day_length(), config.simulation.days);
        let (shutdown, signal) = watch::channel(false);
        let mut launcher = Launcher {
            context: &context,
            schedule,
            signal,
            pending: Vec::new(),
        };

        launcher.add(Supplier::new(
            config.catalog.num_parts,
            config.shipping.supplier_shipment,
        ));
        launcher.add(Warehouse::new(
            config.catalog.num_parts,
            config.warehouse_thresholds(),
            config.shipping.warehouse_shipment,
            config.waiting_flag(),
        ));
        for factory in &config.factories {
            launcher.add(Factory::new(
                factory.id,
                factory.discipline,
                factory.lines,
                config.catalog.num_products,
                config.catalog.batch_size,
                config.kanban.product_red_alert,
            ));
            for line in 1..=factory.lines {
                launcher.add(ProductionLine::new(
                    LineAddress::new(line, factory.id),
                    bom.clone(),
                    config.line_thresholds(),
                    config.waiting_flag(),
                ));
            }
        }
        launcher.add(ProductStock::new(
            config.catalog.num_products,
            config.demand.min,
            config.demand.max,
            config.demand.seed,
        ));

        let nodes: Vec<JoinHandle<()>> = launcher.pending.into_iter().map(tokio::spawn).collect();
        info!(
            nodes = nodes.len(),
            days = config.simulation.days,
            day_length_ms = config.simulation.day_length_ms,
            "Supply chain started"
        );

        Ok(Self {
            context,
            config,
            shutdown,
            nodes,
            store_handles,
        })
    }

    /// Waits for every configured day plus the drain grace, then shuts down.
    pub async fn run_to_completion(self) -> Result<SimulationReport, SystemError> {
        let days = self.config.simulation.days;
        let wait = self.config.day_length() * days
            + Duration::from_millis(self.config.simulation.drain_grace_ms);
        tokio::time::sleep(wait).await;
        self.shutdown().await
    }

    /// Gracefully shuts down the entire system.
    ///
    /// 1. Signals every node, which drains what is already in its inbox and exits
    /// 2. Waits for all node tasks
    /// 3. Reads the final store state into a [`SimulationReport`]
    /// 4. Drops the last clients so the store actors exit, and waits for them
    pub async fn shutdown(self) -> Result<SimulationReport, SystemError> {
        info!("Shutting down system...");

        // Receivers may all be gone already if every node exited on its own
        let _ = self.shutdown.send(true);

        for handle in self.nodes {
            if let Err(e) = handle.await {
                error!("Node task failed: {:?}", e);
                return Err(SystemError::TaskFailed(format!("{:?}", e)));
            }
        }

        let report = SimulationReport::collect(&self.config, &self.context).await?;

        drop(self.context);
        for handle in self.store_handles {
            if let Err(e) = handle.await {
                error!("Store task failed: {:?}", e);
                return Err(SystemError::TaskFailed(format!("{:?}", e)));
            }
        }

        info!("System shutdown complete.");
        Ok(report)
    }
}

type NodeTask = std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>;

/// Subscribes nodes as they are added; nothing runs until the tasks are spawned.
struct Launcher<'a> {
    context: &'a NodeContext,
    schedule: Schedule,
    signal: watch::Receiver<bool>,
    pending: Vec<NodeTask>,
}

impl Launcher<'_> {
    fn add<N: Node<Context = NodeContext>>(&mut self, node: N) {
        let actor = NodeActor::new(node, &self.context.bus, self.schedule, self.signal.clone());
        let ctx = self.context.clone();
        self.pending.push(Box::pin(async move {
            actor.run(ctx).await;
        }));
    }
}
