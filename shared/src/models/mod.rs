//! Data models shared between server and clients

pub mod dining_table;
pub mod order;
pub mod product;
pub mod tenant;

pub use dining_table::{DiningTable, DiningTableCreate};
pub use order::{Order, OrderLine, OrderStatus, PaymentStatus, Station};
pub use product::{Product, ProductCreate};
pub use tenant::{Tenant, TenantCreate};
