//! Comanda server
//!
//! Multi-tenant restaurant ordering backend: QR sessions, session carts,
//! the order lifecycle engine (stock, occupancy, station routing) and a
//! live WebSocket feed for the dashboards.

pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod live;
pub mod orders;
pub mod state;
pub mod tenant;
