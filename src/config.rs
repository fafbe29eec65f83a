//! Simulation settings.
//!
//! Every field has a default, so an empty file (or no file at all) runs the classic
//! scenario: 20 days of 5 seconds, 5 products over 100 parts, one push factory with
//! 5 lines and one pull factory with 8.

use crate::factory_actor::Discipline;
use crate::model::{KanbanThresholds, WaitingFlag};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub catalog: CatalogConfig,
    pub kanban: KanbanConfig,
    pub shipping: ShippingConfig,
    pub demand: DemandConfig,
    pub seed: SeedConfig,
    pub factories: Vec<FactoryConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            catalog: CatalogConfig::default(),
            kanban: KanbanConfig::default(),
            shipping: ShippingConfig::default(),
            demand: DemandConfig::default(),
            seed: SeedConfig::default(),
            factories: default_factories(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub days: u32,
    pub day_length_ms: u64,
    /// Frames a subscriber may fall behind before it starts losing them.
    pub bus_capacity: usize,
    /// Extra wait after the last day so in-flight messages settle.
    pub drain_grace_ms: u64,
    /// Days after which an unanswered replenishment request is re-sent.
    /// Unset: a lost request is never retried.
    pub replenish_timeout_days: Option<u32>,
    /// Entries kept per audit list. Unset keeps all of them.
    pub audit_capacity: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: 20,
            day_length_ms: 5000,
            bus_capacity: 1024,
            drain_grace_ms: 500,
            replenish_timeout_days: None,
            audit_capacity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub num_products: usize,
    pub num_parts: usize,
    pub base_kit_size: usize,
    pub batch_size: i64,
    /// Products file; a catalog is generated when unset.
    pub bom_path: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            num_products: 5,
            num_parts: 100,
            base_kit_size: 43,
            batch_size: 48,
            bom_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KanbanConfig {
    pub line_red: i64,
    pub line_yellow: i64,
    pub warehouse_red: i64,
    pub warehouse_yellow: i64,
    /// Per-line finished-goods red level; factories scale it by their line count.
    pub product_red_alert: i64,
}

impl Default for KanbanConfig {
    fn default() -> Self {
        let batch = CatalogConfig::default().batch_size;
        Self {
            line_red: batch * 3,
            line_yellow: batch * 6,
            warehouse_red: batch * 390,
            warehouse_yellow: batch * 780,
            product_red_alert: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingConfig {
    /// Units per flagged part, supplier to warehouse.
    pub supplier_shipment: i64,
    /// Units per flagged part, warehouse to line.
    pub warehouse_shipment: i64,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        let batch = CatalogConfig::default().batch_size;
        Self {
            supplier_shipment: batch * 1950,
            warehouse_shipment: batch * 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandConfig {
    pub min: i64,
    pub max: i64,
    pub seed: Option<u64>,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            min: 50,
            max: 250,
            seed: None,
        }
    }
}

/// Counter values written before any node starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub product_stock: i64,
    pub warehouse_stock: i64,
    pub line_stock: i64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            product_stock: 1000,
            warehouse_stock: CatalogConfig::default().batch_size * 1000,
            line_stock: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryConfig {
    pub id: u32,
    pub discipline: Discipline,
    pub lines: u32,
}

fn default_factories() -> Vec<FactoryConfig> {
    vec![
        FactoryConfig {
            id: 1,
            discipline: Discipline::Push,
            lines: 5,
        },
        FactoryConfig {
            id: 2,
            discipline: Discipline::Pull,
            lines: 8,
        },
    ]
}

impl SimConfig {
    /// The classic scenario.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reject settings the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        let sim = &self.simulation;
        let catalog = &self.catalog;
        let kanban = &self.kanban;

        if sim.day_length_ms == 0 {
            return invalid("simulation.day_length_ms must be positive".into());
        }
        if sim.bus_capacity == 0 {
            return invalid("simulation.bus_capacity must be positive".into());
        }
        if sim.audit_capacity == Some(0) {
            return invalid("simulation.audit_capacity must be positive".into());
        }
        if catalog.num_products == 0 {
            return invalid("catalog.num_products must be positive".into());
        }
        if catalog.base_kit_size > catalog.num_parts {
            return invalid(format!(
                "catalog.base_kit_size {} exceeds num_parts {}",
                catalog.base_kit_size, catalog.num_parts
            ));
        }
        if catalog.batch_size <= 0 {
            return invalid("catalog.batch_size must be positive".into());
        }
        if kanban.line_red > kanban.line_yellow {
            return invalid("kanban.line_red must not exceed line_yellow".into());
        }
        if kanban.warehouse_red > kanban.warehouse_yellow {
            return invalid("kanban.warehouse_red must not exceed warehouse_yellow".into());
        }
        if kanban.product_red_alert < 0 {
            return invalid("kanban.product_red_alert must not be negative".into());
        }
        if self.shipping.supplier_shipment <= 0 || self.shipping.warehouse_shipment <= 0 {
            return invalid("shipping amounts must be positive".into());
        }
        if self.demand.min < 0 || self.demand.min > self.demand.max {
            return invalid(format!(
                "demand range {}..={} is empty or negative",
                self.demand.min, self.demand.max
            ));
        }
        if self.seed.product_stock < 0 || self.seed.warehouse_stock < 0 || self.seed.line_stock < 0 {
            return invalid("seed values must not be negative".into());
        }
        if self.factories.is_empty() {
            return invalid("at least one factory is required".into());
        }
        let mut ids = HashSet::new();
        for factory in &self.factories {
            if !ids.insert(factory.id) {
                return invalid(format!("duplicate factory id {}", factory.id));
            }
            if factory.lines == 0 {
                return invalid(format!("factory {} has no lines", factory.id));
            }
        }
        Ok(())
    }

    pub fn day_length(&self) -> Duration {
        Duration::from_millis(self.simulation.day_length_ms)
    }

    pub fn line_thresholds(&self) -> KanbanThresholds {
        KanbanThresholds::new(self.kanban.line_red, self.kanban.line_yellow)
    }

    pub fn warehouse_thresholds(&self) -> KanbanThresholds {
        KanbanThresholds::new(self.kanban.warehouse_red, self.kanban.warehouse_yellow)
    }

    /// A fresh waiting flag with the configured timeout.
    pub fn waiting_flag(&self) -> WaitingFlag {
        WaitingFlag::new(self.simulation.replenish_timeout_days)
    }

    /// Total number of production lines.
    pub fn line_count(&self) -> usize {
        self.factories.iter().map(|f| f.lines as usize).sum()
    }
}
