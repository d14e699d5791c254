//! Real-time event payloads
//!
//! Events carry enough denormalized data (order number, table number,
//! status, timestamp) that a subscriber never needs a follow-up query to
//! render a notification. Delivery is at-most-once: a disconnected
//! subscriber re-syncs by querying current state on reconnect.

use serde::{Deserialize, Serialize};

use crate::models::order::OrderStatus;

/// Envelope published on a live topic.
///
/// `version` increases monotonically per topic so clients can discard
/// stale or duplicate deliveries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveMessage {
    pub version: u64,
    #[serde(flatten)]
    pub event: LiveEvent,
}

/// Typed live events, JSON-tagged the way dashboard clients consume them:
/// `{"type": "new_order", "order_id": 1, ...}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A new order entered the restaurant's queue
    NewOrder {
        order_id: i64,
        order_number: String,
        table_number: String,
        items_count: i64,
        total_amount: f64,
        message: String,
        timestamp: String,
    },
    /// An order moved along the state machine
    OrderStatusUpdate {
        order_id: i64,
        order_number: String,
        table_number: String,
        status: OrderStatus,
        status_display: String,
        message: String,
        updated_by: String,
        timestamp: String,
    },
    /// An order was cancelled (reason included for the dashboards)
    OrderCancelled {
        order_id: i64,
        order_number: String,
        table_number: String,
        reason: String,
        message: String,
        timestamp: String,
    },
}

impl LiveEvent {
    pub fn order_id(&self) -> i64 {
        match self {
            Self::NewOrder { order_id, .. }
            | Self::OrderStatusUpdate { order_id, .. }
            | Self::OrderCancelled { order_id, .. } => *order_id,
        }
    }
}
