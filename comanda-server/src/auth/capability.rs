//! Capability set
//!
//! Replaces per-view role checks: each session token carries a capability
//! set evaluated once per request and consulted by every transition.

use serde::{Deserialize, Serialize};

/// Capabilities the auth collaborator can grant a principal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Platform operator: sees all tenants
    Administrator,
    /// Restaurant owner
    Owner,
    Kitchen,
    Bar,
    Cashier,
    CustomerCare,
    Customer,
}

impl Capability {
    /// Any staff capability (everything but plain customers)
    pub fn is_staff(&self) -> bool {
        !matches!(self, Capability::Customer)
    }
}

/// Capabilities allowed to confirm a pending order
pub const CONFIRM_CAPABILITIES: &[Capability] = &[
    Capability::Kitchen,
    Capability::Bar,
    Capability::Owner,
    Capability::Administrator,
];

/// Capabilities allowed to settle payments
pub const SETTLE_CAPABILITIES: &[Capability] = &[
    Capability::Cashier,
    Capability::Owner,
    Capability::Administrator,
];
