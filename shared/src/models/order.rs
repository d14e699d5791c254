//! Order Model
//!
//! Order/OrderLine entities plus the status state machine. The transition
//! graph lives here so dashboards can grey out illegal actions with the
//! same rules the server enforces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Preparation station a line item is routed to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Station {
    #[default]
    Kitchen,
    Bar,
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kitchen => write!(f, "kitchen"),
            Self::Bar => write!(f, "bar"),
        }
    }
}

/// Payment status of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

/// Order status
///
/// Forward path: `pending → confirmed → preparing → ready → served`.
/// `cancelled` is reachable from every non-terminal state, including
/// `served` (post-hoc refund/correction). The waste variants are terminal
/// and reachable only from `ready`/`served`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Cancelled,
    CustomerRefused,
    KitchenError,
    QualityIssue,
    Wasted,
}

impl OrderStatus {
    /// Human-readable name for notifications and receipts
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Preparing => "Preparing",
            Self::Ready => "Ready",
            Self::Served => "Served",
            Self::Cancelled => "Cancelled",
            Self::CustomerRefused => "Customer Refused",
            Self::KitchenError => "Kitchen Error",
            Self::QualityIssue => "Quality Issue",
            Self::Wasted => "Food Wasted",
        }
    }

    /// Waste/refusal terminal recorded by the waste collaborator
    pub fn is_waste(&self) -> bool {
        matches!(
            self,
            Self::CustomerRefused | Self::KitchenError | Self::QualityIssue | Self::Wasted
        )
    }

    /// Terminal for the state machine: no further transitions allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled) || self.is_waste()
    }

    /// Whether an order in this status keeps its table occupied.
    ///
    /// `served` still occupies until the bill is settled.
    pub fn occupies_table(&self, payment: PaymentStatus) -> bool {
        match self {
            Self::Pending | Self::Confirmed | Self::Preparing | Self::Ready => true,
            Self::Served => payment != PaymentStatus::Paid,
            _ => false,
        }
    }

    /// Valid next statuses from this one.
    ///
    /// Includes the backward correction edges staff use to undo
    /// mis-clicks; those must not re-apply stock or occupancy effects.
    pub fn valid_transitions(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Pending, Preparing, Cancelled],
            Preparing => &[Confirmed, Ready, Cancelled],
            Ready => &[
                Preparing,
                Served,
                Cancelled,
                CustomerRefused,
                KitchenError,
                QualityIssue,
                Wasted,
            ],
            Served => &[
                Ready,
                Cancelled,
                CustomerRefused,
                KitchenError,
                QualityIssue,
                Wasted,
            ],
            Cancelled | CustomerRefused | KitchenError | QualityIssue | Wasted => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    /// Backward correction edge (undo, not progress)
    pub fn is_correction(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Confirmed, Pending) | (Preparing, Confirmed) | (Ready, Preparing) | (Served, Ready)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Served => "served",
            Self::Cancelled => "cancelled",
            Self::CustomerRefused => "customer_refused",
            Self::KitchenError => "kitchen_error",
            Self::QualityIssue => "quality_issue",
            Self::Wasted => "wasted",
        };
        write!(f, "{s}")
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub tenant_id: i64,
    pub table_id: i64,
    /// Globally unique public identifier ("ORD-1A2B3C4D")
    pub order_number: String,
    pub placed_by: String,
    pub confirmed_by: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Total in currency unit, always recomputed from lines
    pub total_amount: f64,
    pub special_instructions: String,
    pub reason_if_cancelled: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line with price/station snapshotted at placement time.
///
/// Immutable after placement: later menu price or promotion changes never
/// alter an existing order's total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub station: Station,
}
