//! # Message Bus
//!
//! Named pub/sub channels shared by every node. Each channel is one
//! `tokio::sync::broadcast`, so every subscriber sees every frame published after it
//! subscribed, in publish order. Lines share a single channel and filter by address.

pub mod codec;

pub use codec::{CodecError, LineAddress, Message};

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// The five named channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Line,
    Warehouse,
    Supplier,
    ProductStock,
    Factory,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Line,
        Channel::Warehouse,
        Channel::Supplier,
        Channel::ProductStock,
        Channel::Factory,
    ];

    fn index(self) -> usize {
        match self {
            Channel::Line => 0,
            Channel::Warehouse => 1,
            Channel::Supplier => 2,
            Channel::ProductStock => 3,
            Channel::Factory => 4,
        }
    }

    /// Wire name of the channel.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Line => "channel:line",
            Channel::Warehouse => "channel:warehouse",
            Channel::Supplier => "channel:supplier",
            Channel::ProductStock => "channel:product_stock",
            Channel::Factory => "channel:factory",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to the shared bus. Cheap to clone.
#[derive(Clone)]
pub struct Bus {
    senders: Arc<[broadcast::Sender<String>; 5]>,
}

impl Bus {
    /// `capacity` bounds how far a slow subscriber may fall behind before it lags.
    pub fn new(capacity: usize) -> Self {
        let senders = Channel::ALL.map(|_| broadcast::channel(capacity.max(1)).0);
        Self {
            senders: Arc::new(senders),
        }
    }

    /// Subscribe to `channel`. Only frames published after this call are delivered.
    pub fn subscribe(&self, channel: Channel) -> broadcast::Receiver<String> {
        self.senders[channel.index()].subscribe()
    }

    /// Encode and publish `message` on its own channel. Returns the subscriber count.
    pub fn publish(&self, message: &Message) -> usize {
        self.publish_frame(message.channel(), message.encode())
    }

    /// Publish a raw frame. Frames with no subscriber are dropped.
    pub fn publish_frame(&self, channel: Channel, frame: String) -> usize {
        trace!(%channel, %frame, "Publish");
        match self.senders[channel.index()].send(frame) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(frame)) => {
                debug!(%channel, %frame, "No subscribers, frame dropped");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_subscriber_sees_every_frame_in_order() {
        let bus = Bus::new(16);
        let mut a = bus.subscribe(Channel::Factory);
        let mut b = bus.subscribe(Channel::Factory);

        let first = Message::StockStatus { stock: vec![1, 2] };
        let second = Message::StockStatus { stock: vec![3, 4] };
        assert_eq!(bus.publish(&first), 2);
        assert_eq!(bus.publish(&second), 2);

        for rx in [&mut a, &mut b] {
            assert_eq!(rx.recv().await.unwrap(), "update_factory/1;2");
            assert_eq!(rx.recv().await.unwrap(), "update_factory/3;4");
        }
    }

    #[tokio::test]
    async fn test_channels_are_isolated() {
        let bus = Bus::new(4);
        let mut supplier = bus.subscribe(Channel::Supplier);
        let _warehouse = bus.subscribe(Channel::Warehouse);

        bus.publish(&Message::SupplierShipment { parts: vec![1] });
        assert!(supplier.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_dropped() {
        let bus = Bus::new(4);
        assert_eq!(bus.publish_frame(Channel::Line, "receive_order/1/1/0/10".into()), 0);

        // A late subscriber does not see earlier frames
        let mut late = bus.subscribe(Channel::Line);
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(Channel::ProductStock.to_string(), "channel:product_stock");
        assert_eq!(Channel::Line.name(), "channel:line");
    }
}
