//! The upstream supplier. Reactive only, with unlimited stock.

use crate::bus::{Channel, Message};
use crate::clients::NodeContext;
use crate::framework::Node;
use async_trait::async_trait;
use std::convert::Infallible;
use tracing::info;

pub struct Supplier {
    num_parts: usize,
    shipment_size: i64,
}

impl Supplier {
    pub fn new(num_parts: usize, shipment_size: i64) -> Self {
        Self {
            num_parts,
            shipment_size,
        }
    }

    /// The fixed amount for every flagged part, zero elsewhere.
    /// Flags beyond the catalog are ignored.
    pub fn send_parts(&self, flags: &[bool], ctx: &NodeContext) -> Vec<i64> {
        let parts: Vec<i64> = (0..self.num_parts)
            .map(|i| {
                if flags.get(i).copied().unwrap_or(false) {
                    self.shipment_size
                } else {
                    0
                }
            })
            .collect();
        ctx.bus.publish(&Message::SupplierShipment {
            parts: parts.clone(),
        });
        info!(parts = flags.iter().filter(|&&f| f).count(), "Order received, parts shipped");
        parts
    }
}

#[async_trait]
impl Node for Supplier {
    type Context = NodeContext;
    type Error = Infallible;

    fn name(&self) -> String {
        "supplier".to_string()
    }

    fn channel(&self) -> Channel {
        Channel::Supplier
    }

    fn runs_daily(&self) -> bool {
        false
    }

    async fn handle_message(&mut self, message: Message, ctx: &NodeContext) -> Result<(), Infallible> {
        if let Message::SupplierRequest { flags } = message {
            self.send_parts(&flags, ctx);
        }
        Ok(())
    }
}
