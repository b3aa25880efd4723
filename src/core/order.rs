//! The order model the board operates on
//!
//! An [`Order`] is the normalized in-memory shape produced by the projection
//! layer from whatever the store persisted. It carries a denormalized
//! customer snapshot and a line-item list; the raw persisted encodings
//! (JSON-string item blobs, status synonyms, nested customer relations)
//! never escape the projection boundary.

use crate::core::status::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recomputed and persisted totals are considered equal within half a
/// currency minor unit.
pub const TOTAL_TOLERANCE: f64 = 0.005;

/// A single line item on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Menu item name as shown on cards and receipts
    pub name: String,

    /// How many of this item; at least 1
    pub quantity: u32,

    /// Price per unit in currency units; never negative
    pub unit_price: f64,
}

impl OrderItem {
    /// Create a new line item
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Total for this line (`quantity × unit_price`)
    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    /// The `"2x Classic Burger"` label board cards display
    pub fn display_label(&self) -> String {
        format!("{}x {}", self.quantity, self.name)
    }
}

/// Customer details captured at order-creation time.
///
/// This is a snapshot, not a live reference: the board only ever needs the
/// name and contact details as they were when the order was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CustomerSnapshot {
    /// Create a snapshot from known details
    pub fn new(name: impl Into<String>, phone: impl Into<String>, email: Option<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email,
        }
    }

    /// Fallback snapshot for raw records that carry no customer relation.
    /// The board shows "Guest" / "N/A" rather than dropping the order.
    pub fn guest() -> Self {
        Self {
            name: "Guest".to_string(),
            phone: "N/A".to_string(),
            email: None,
        }
    }
}

/// Customer details supplied when placing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A new order as submitted by the placement flow.
///
/// Identity, status and timestamps are assigned by the order store; the
/// input only carries what the customer chose. Must pass
/// [`crate::core::validation::validate_new_order`] before reaching the
/// store; an order with zero items cannot be created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer: CustomerInput,
    pub items: Vec<OrderItem>,
}

impl NewOrder {
    /// Sum of `quantity × unit_price` over the submitted items
    pub fn total(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// Non-fatal flags attached by the projection layer.
///
/// A degraded record is still shown on the board; these flags let the UI
/// badge it and let operators find the bad rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionDiagnostics {
    /// The items field could not be parsed; `items` is empty
    #[serde(default)]
    pub items_unparseable: bool,

    /// The persisted total was absent, non-numeric, or inconsistent with
    /// the item sum; `total_amount` holds the recomputed value
    #[serde(default)]
    pub total_recomputed: bool,

    /// The persisted status was missing or unrecognized; defaulted to New
    #[serde(default)]
    pub status_defaulted: bool,
}

impl ProjectionDiagnostics {
    /// True when any degradation was recorded
    pub fn is_degraded(&self) -> bool {
        self.items_unparseable || self.total_recomputed || self.status_defaulted
    }

    fn is_clean(&self) -> bool {
        !self.is_degraded()
    }
}

/// A pickup order in the normalized shape the board operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned identity; immutable
    pub id: Uuid,

    /// Short human-facing label derived from the id (`#` + first 8 chars).
    /// Used for lookup and display, never for identity.
    pub display_number: String,

    /// Current lifecycle stage
    pub status: OrderStatus,

    /// Customer details snapshotted at creation
    pub customer: CustomerSnapshot,

    /// Line items; never empty for a well-formed persisted order
    pub items: Vec<OrderItem>,

    /// Order total in currency units
    pub total_amount: f64,

    /// Set once at creation
    pub created_at: DateTime<Utc>,

    /// Bumped on every status or content mutation
    pub updated_at: DateTime<Utc>,

    /// Projection degradation flags; all false for clean records
    #[serde(default, skip_serializing_if = "ProjectionDiagnostics::is_clean")]
    pub diagnostics: ProjectionDiagnostics,
}

impl Order {
    /// Derive the human-facing display number from an order id.
    ///
    /// Deterministic fixed-length prefix of the id's simple (dash-free)
    /// form, e.g. `#1f3a9b2c`.
    pub fn display_number_for(id: &Uuid) -> String {
        let simple = id.simple().to_string();
        format!("#{}", &simple[..8])
    }

    /// Sum of `quantity × unit_price` over all items
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Whether the order still occupies a board column
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Bump `updated_at` after a mutation
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
