//! Live fan-out
//!
//! Minimal topic-based pub/sub: one tokio broadcast channel per topic,
//! lazily created, fire-and-forget publishing. The transport (WebSocket,
//! in-process subscriber in tests) only ever sees
//! `subscribe(topic) -> Receiver`.

pub mod ws;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dashmap::DashMap;
use shared::live::{LiveEvent, LiveMessage};
use tokio::sync::broadcast;

/// A named pub/sub channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Consumed by the customer tracking one order (and auditors)
    Order(i64),
    /// Consumed by kitchen/bar/cashier dashboards of one restaurant
    Restaurant(i64),
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order(id) => write!(f, "order:{id}"),
            Self::Restaurant(id) => write!(f, "restaurant:{id}"),
        }
    }
}

impl FromStr for Topic {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.split_once(':').ok_or(())?;
        let id: i64 = id.parse().map_err(|_| ())?;
        match kind {
            "order" => Ok(Topic::Order(id)),
            "restaurant" => Ok(Topic::Restaurant(id)),
            _ => Err(()),
        }
    }
}

/// 实时消息总线 - 按主题广播生命周期事件
///
/// Publishing is synchronous-call/async-delivery: `publish` stamps the
/// per-topic version and returns without waiting for any subscriber.
/// Delivery is at-most-once; a disconnected subscriber misses events and
/// re-syncs by querying current state on reconnect.
#[derive(Clone)]
pub struct LiveBus {
    channels: Arc<DashMap<Topic, broadcast::Sender<LiveMessage>>>,
    /// Per-topic monotonically increasing version numbers
    versions: Arc<DashMap<Topic, u64>>,
    capacity: usize,
}

impl LiveBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            versions: Arc::new(DashMap::new()),
            capacity,
        }
    }

    fn sender(&self, topic: Topic) -> broadcast::Sender<LiveMessage> {
        self.channels
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    fn next_version(&self, topic: Topic) -> u64 {
        let mut entry = self.versions.entry(topic).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Publish an event to a topic. Never blocks, never fails into the
    /// caller: delivery problems are logged and swallowed.
    pub fn publish(&self, topic: Topic, event: LiveEvent) {
        let version = self.next_version(topic);
        let message = LiveMessage { version, event };
        match self.sender(topic).send(message) {
            Ok(receivers) => {
                tracing::debug!(topic = %topic, version, receivers, "live event published");
            }
            Err(_) => {
                // No subscriber on this topic right now; the event is
                // intentionally dropped (no replay log).
                tracing::trace!(topic = %topic, version, "live event had no subscribers");
            }
        }
    }

    /// Subscribe to a topic. The receiver only sees events published
    /// after this call.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<LiveMessage> {
        self.sender(topic).subscribe()
    }
}
