//! Order domain
//!
//! - [`engine`] - lifecycle engine (placement, transitions, payment)
//! - [`money`] - decimal money arithmetic
//! - [`occupancy`] - table occupancy manager

pub mod engine;
pub mod money;
pub mod occupancy;

pub use engine::{OrderEngine, OrderView, PlacementItem, PlacementRequest};
