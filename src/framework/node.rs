//! # Simulation Nodes
//!
//! A [`Node`] is one participant of the simulation (a line, the warehouse, a factory...).
//! It owns its local state and reacts to two stimuli: frames on its bus channel, and
//! the day ticker.
//!
//! [`NodeActor`] drives a node from a single task. Both stimuli are awaited in the
//! same `select!`, so a node never runs its daily check while it is still applying a
//! shipment, and vice versa.

use crate::bus::{Bus, Channel, Message};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, info_span, warn, Instrument};

/// A simulation participant.
#[async_trait]
pub trait Node: Send + 'static {
    /// Shared dependencies handed to every callback.
    type Context: Send + Sync + 'static;

    /// The error type for this node.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Name used in logs.
    fn name(&self) -> String;

    /// The channel this node listens on.
    fn channel(&self) -> Channel;

    /// Whether the node has a daily duty. Purely reactive nodes return `false`.
    fn runs_daily(&self) -> bool {
        true
    }

    /// React to a decoded message from [`Node::channel`].
    async fn handle_message(
        &mut self,
        message: Message,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// The daily duty for `day` (0-based).
    async fn on_day(&mut self, _day: u32, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// How long a simulated day lasts and how many of them there are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    pub day_length: Duration,
    pub days: u32,
}

impl Schedule {
    pub fn new(day_length: Duration, days: u32) -> Self {
        Self { day_length, days }
    }
}

/// Runs one [`Node`] until shutdown.
pub struct NodeActor<N: Node> {
    node: N,
    inbox: broadcast::Receiver<String>,
    schedule: Schedule,
    shutdown: watch::Receiver<bool>,
}

impl<N: Node> NodeActor<N> {
    /// Subscribes to the node's channel immediately, so nothing published after
    /// construction is missed even if the task has not been polled yet.
    pub fn new(node: N, bus: &Bus, schedule: Schedule, shutdown: watch::Receiver<bool>) -> Self {
        let inbox = bus.subscribe(node.channel());
        Self {
            node,
            inbox,
            schedule,
            shutdown,
        }
    }

    /// Runs the event loop and returns the node with its final state.
    ///
    /// The first day fires one `day_length` after start. Once `days` days have run
    /// the node keeps listening until shutdown. On shutdown, frames already queued in
    /// the inbox are still handled.
    pub async fn run(self, ctx: N::Context) -> N {
        let NodeActor {
            mut node,
            mut inbox,
            schedule,
            mut shutdown,
        } = self;
        let span = info_span!("node", name = %node.name());

        async move {
            let channel = node.channel();
            let daily = node.runs_daily();
            let mut ticker = interval_at(
                Instant::now() + schedule.day_length,
                schedule.day_length.max(Duration::from_millis(1)),
            );
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut day: u32 = 0;

            info!(%channel, days = schedule.days, "Node started");

            loop {
                tokio::select! {
                    biased;

                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    received = inbox.recv() => match received {
                        Ok(frame) => dispatch(&mut node, channel, &frame, &ctx).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Inbox lagged, frames lost");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = ticker.tick(), if daily && day < schedule.days => {
                        debug!(day, "Day");
                        if let Err(e) = node.on_day(day, &ctx).await {
                            warn!(day, error = %e, "Daily duty failed");
                        }
                        day += 1;
                    }
                }
            }

            // Drain what was already delivered before the stop signal
            let mut drained = 0usize;
            loop {
                match inbox.try_recv() {
                    Ok(frame) => {
                        dispatch(&mut node, channel, &frame, &ctx).await;
                        drained += 1;
                    }
                    Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Inbox lagged, frames lost");
                    }
                    Err(_) => break,
                }
            }

            info!(days_run = day, drained, "Node stopped");
            node
        }
        .instrument(span)
        .await
    }
}

async fn dispatch<N: Node>(node: &mut N, channel: Channel, frame: &str, ctx: &N::Context) {
    let message = match Message::decode(channel, frame) {
        Ok(message) => message,
        Err(e) => {
            warn!(%frame, error = %e, "Unrecognized message");
            return;
        }
    };
    if let Err(e) = node.handle_message(message, ctx).await {
        warn!(%frame, error = %e, "Message handling failed");
    }
}
