//! Projection of raw persisted records into board orders
//!
//! The order store hands back whatever was persisted, and different
//! producers persisted different dialects over time: items as a structured
//! list, as a JSON-encoded string of that list, or as bare `"2x Burger"`
//! display strings; statuses as `pending`/`completed` or `New`/`Picked Up`;
//! customers as a nested relation record or as flat columns.
//!
//! [`project`] normalizes all of it into one [`Order`] shape and never
//! fails: malformed pieces degrade to safe defaults and are flagged in
//! [`ProjectionDiagnostics`] instead of discarding the record. A broken row
//! still shows up on the board where staff can see and fix it.

use crate::core::order::{
    CustomerSnapshot, Order, OrderItem, ProjectionDiagnostics, TOTAL_TOLERANCE,
};
use crate::core::status::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Customer relation record as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawCustomerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// An order row exactly as the store returns it.
///
/// Field aliases cover every known producer dialect; anything that needs
/// interpretation (items, total, status, timestamps) stays loosely typed
/// here and is normalized by [`project`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawOrderRecord {
    pub id: Uuid,

    /// Nested customer relation (the relational store joins it in)
    #[serde(default, alias = "customer", skip_serializing_if = "Option::is_none")]
    pub customers: Option<RawCustomerRecord>,

    /// Flat customer columns (older board variants)
    #[serde(default, alias = "customerName", skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(
        default,
        alias = "contactNumber",
        alias = "customer_phone",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_number: Option<String>,

    /// Structured list, JSON-encoded string, or display-string list
    #[serde(default)]
    pub items: Option<Value>,

    /// Number or numeric string; absent in some dialects
    #[serde(default, alias = "totalAmount", skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Value>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(
        default,
        alias = "createdAt",
        alias = "timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Project a raw persisted record into the normalized board shape.
///
/// Total and infallible: every malformed piece degrades with a diagnostics
/// flag rather than an error.
pub fn project(raw: &RawOrderRecord) -> Order {
    let mut diagnostics = ProjectionDiagnostics::default();

    let items = match raw.items.as_ref().and_then(parse_items) {
        Some(items) => items,
        None => {
            diagnostics.items_unparseable = true;
            Vec::new()
        }
    };

    let persisted_total = raw.total_amount.as_ref().and_then(parse_amount);
    let total_amount = reconcile_total(persisted_total, &items, diagnostics.items_unparseable)
        .unwrap_or_else(|| {
            diagnostics.total_recomputed = true;
            items.iter().map(OrderItem::line_total).sum()
        });

    let status = match raw.status.as_deref().and_then(OrderStatus::parse) {
        Some(status) => status,
        None => {
            diagnostics.status_defaulted = true;
            OrderStatus::New
        }
    };

    let created_at = raw
        .created_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now);
    let updated_at = raw
        .updated_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(created_at);

    Order {
        id: raw.id,
        display_number: Order::display_number_for(&raw.id),
        status,
        customer: project_customer(raw),
        items,
        total_amount,
        created_at,
        updated_at,
        diagnostics,
    }
}

/// Project a full fetch result. Order of the input is preserved.
pub fn project_all(raw: &[RawOrderRecord]) -> Vec<Order> {
    raw.iter().map(project).collect()
}

fn project_customer(raw: &RawOrderRecord) -> CustomerSnapshot {
    if let Some(customer) = &raw.customers {
        return CustomerSnapshot::new(
            customer.name.clone().unwrap_or_else(|| "Guest".to_string()),
            customer.phone.clone().unwrap_or_else(|| "N/A".to_string()),
            customer.email.clone(),
        );
    }

    if raw.customer_name.is_some() || raw.contact_number.is_some() {
        return CustomerSnapshot::new(
            raw.customer_name.clone().unwrap_or_else(|| "Guest".to_string()),
            raw.contact_number.clone().unwrap_or_else(|| "N/A".to_string()),
            None,
        );
    }

    CustomerSnapshot::guest()
}

/// Decide which total to trust.
///
/// The persisted value wins when the items are not locally recomputable or
/// when it agrees with the item sum within [`TOTAL_TOLERANCE`]. Returns
/// `None` when the total must be recomputed (caller flags it).
fn reconcile_total(persisted: Option<f64>, items: &[OrderItem], unparseable: bool) -> Option<f64> {
    let persisted = persisted?;
    if unparseable || items.is_empty() {
        // Not recomputable locally, the stored value is all we have
        return Some(persisted);
    }
    let computed: f64 = items.iter().map(OrderItem::line_total).sum();
    if (persisted - computed).abs() <= TOTAL_TOLERANCE {
        Some(persisted)
    } else {
        None
    }
}

/// Parse the items field in any of its persisted encodings.
///
/// Returns `None` when the encoding is unrecognizable; the caller flags the
/// order and shows it with an empty item list.
fn parse_items(value: &Value) -> Option<Vec<OrderItem>> {
    match value {
        // JSON-encoded string of the structured list
        Value::String(encoded) => {
            let parsed: Value = serde_json::from_str(encoded).ok()?;
            parse_items(&parsed)
        }
        Value::Array(entries) => {
            let mut items = Vec::with_capacity(entries.len());
            for entry in entries {
                items.push(parse_item_entry(entry)?);
            }
            Some(items)
        }
        _ => None,
    }
}

fn parse_item_entry(entry: &Value) -> Option<OrderItem> {
    match entry {
        Value::Object(fields) => {
            let name = value_str(fields.get("name")).unwrap_or_else(|| "Unknown Item".to_string());
            let quantity = value_u32(fields.get("quantity")).unwrap_or(1).max(1);
            let unit_price = fields
                .get("unit_price")
                .or_else(|| fields.get("unitPrice"))
                .or_else(|| fields.get("price"))
                .and_then(parse_amount)
                .unwrap_or(0.0)
                .max(0.0);
            Some(OrderItem::new(name, quantity, unit_price))
        }
        // Display-string dialect: "2x Classic Burger"
        Value::String(label) => Some(parse_item_label(label)),
        _ => None,
    }
}

/// Parse a `"2x Classic Burger"` display string. A missing quantity prefix
/// means a single unit; prices are unrecoverable from this dialect.
fn parse_item_label(label: &str) -> OrderItem {
    if let Some((count, name)) = label.split_once('x') {
        if let Ok(quantity) = count.trim().parse::<u32>() {
            return OrderItem::new(name.trim(), quantity.max(1), 0.0);
        }
    }
    OrderItem::new(label.trim(), 1, 0.0)
}

fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn value_str(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn value_u32(value: Option<&Value>) -> Option<u32> {
    let value = value?;
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    // Some producers write quantities as floats or strings
    if let Some(f) = value.as_f64() {
        if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 {
            return Some(f as u32);
        }
    }
    value.as_str().and_then(|s| s.trim().parse().ok())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
