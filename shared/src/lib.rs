//! Shared types for the Comanda ordering platform
//!
//! Serializable models and real-time event payloads used by the server
//! and its clients (kitchen/bar dashboards, customer tracking page).

pub mod live;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use live::LiveEvent;
pub use models::order::{OrderStatus, PaymentStatus, Station};
