//! In-memory implementation of OrderStore for testing and development

use crate::core::order::{CustomerInput, NewOrder};
use crate::core::projection::{RawCustomerRecord, RawOrderRecord};
use crate::core::service::OrderStore;
use crate::core::status::OrderStatus;
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory order store implementation
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Records are kept in the same raw shape the hosted store returns: items
/// persisted as a JSON-encoded string column, statuses as wire names, so
/// everything downstream exercises the real projection paths.
#[derive(Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<Uuid, RawOrderRecord>>>,
    customers: Arc<RwLock<HashMap<String, RawCustomerRecord>>>,
}

impl InMemoryOrderStore {
    /// Create an empty in-memory order store
    pub fn new() -> Self {
        Self {
            orders: Arc::new(RwLock::new(HashMap::new())),
            customers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A store pre-seeded with a handful of demonstration orders covering
    /// every lifecycle stage.
    pub fn with_demo_orders() -> Self {
        let seeds: [(&str, &str, &[(&str, u32, f64)], OrderStatus, i64); 6] = [
            (
                "Alice Smith",
                "555-1234",
                &[("Classic Burger", 1, 8.50), ("Fries", 1, 3.25), ("Coke", 1, 2.00)],
                OrderStatus::New,
                60,
            ),
            (
                "Bob Johnson",
                "555-5678",
                &[("Pepperoni Pizza", 2, 12.00), ("Garlic Knots", 1, 4.50)],
                OrderStatus::Preparing,
                30,
            ),
            (
                "Charlie Brown",
                "555-9012",
                &[("Chicken Sandwich", 1, 9.00), ("Onion Rings", 1, 4.00)],
                OrderStatus::Ready,
                10,
            ),
            (
                "Diana Prince",
                "555-2468",
                &[("Tacos", 3, 3.50), ("Guacamole", 1, 2.50)],
                OrderStatus::New,
                2,
            ),
            (
                "Eve Adams",
                "555-3333",
                &[("Vegan Bowl", 1, 11.00)],
                OrderStatus::PickedUp,
                120,
            ),
            (
                "Frank White",
                "555-4444",
                &[("Large Pizza", 1, 16.00)],
                OrderStatus::Cancelled,
                16,
            ),
        ];

        let mut orders = HashMap::new();
        for (name, phone, items, status, minutes_ago) in seeds {
            let created = Utc::now() - chrono::Duration::minutes(minutes_ago);
            let items_json: Vec<serde_json::Value> = items
                .iter()
                .map(|(name, quantity, unit_price)| {
                    json!({"name": name, "quantity": quantity, "unit_price": unit_price})
                })
                .collect();
            let total: f64 = items
                .iter()
                .map(|(_, quantity, unit_price)| *quantity as f64 * unit_price)
                .sum();
            let id = Uuid::new_v4();
            orders.insert(
                id,
                RawOrderRecord {
                    id,
                    customers: Some(RawCustomerRecord {
                        id: Some(Uuid::new_v4()),
                        name: Some(name.to_string()),
                        phone: Some(phone.to_string()),
                        email: None,
                    }),
                    customer_name: None,
                    contact_number: None,
                    items: Some(json!(serde_json::Value::Array(items_json).to_string())),
                    total_amount: Some(json!(total)),
                    status: Some(status.wire_name().to_string()),
                    created_at: Some(created.to_rfc3339()),
                    updated_at: Some(created.to_rfc3339()),
                },
            );
        }

        Self {
            orders: Arc::new(RwLock::new(orders)),
            customers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of persisted orders (test helper)
    pub fn order_count(&self) -> usize {
        self.orders.read().map(|orders| orders.len()).unwrap_or(0)
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn fetch_all(&self) -> Result<Vec<RawOrderRecord>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut all: Vec<RawOrderRecord> = orders.values().cloned().collect();
        // Newest first, like the hosted store's created_at descending order
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_status(&self, id: &Uuid, status: OrderStatus) -> Result<RawOrderRecord> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let record = orders
            .get_mut(id)
            .ok_or_else(|| anyhow!("Order '{}' not found", id))?;

        record.status = Some(status.wire_name().to_string());
        record.updated_at = Some(Utc::now().to_rfc3339());

        Ok(record.clone())
    }

    async fn create_order(&self, order: NewOrder) -> Result<RawOrderRecord> {
        if order.items.is_empty() {
            bail!("an order must contain at least one item");
        }

        let customer = self.upsert_customer(order.customer.clone()).await?;

        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let record = RawOrderRecord {
            id,
            customers: Some(customer),
            customer_name: None,
            contact_number: None,
            items: Some(json!(serde_json::to_string(&order.items)?)),
            total_amount: Some(json!(order.total())),
            status: Some(OrderStatus::New.wire_name().to_string()),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };

        orders.insert(id, record.clone());
        Ok(record)
    }

    async fn update_order(&self, record: RawOrderRecord) -> Result<RawOrderRecord> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if !orders.contains_key(&record.id) {
            bail!("Order '{}' not found", record.id);
        }

        let mut updated = record;
        updated.updated_at = Some(Utc::now().to_rfc3339());
        orders.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn upsert_customer(&self, customer: CustomerInput) -> Result<RawCustomerRecord> {
        let mut customers = self
            .customers
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let record = customers
            .entry(customer.phone.clone())
            .or_insert_with(|| RawCustomerRecord {
                id: Some(Uuid::new_v4()),
                name: Some(customer.name.clone()),
                phone: Some(customer.phone.clone()),
                email: customer.email.clone(),
            });

        // A returning customer may have corrected their details
        record.name = Some(customer.name);
        if customer.email.is_some() {
            record.email = customer.email;
        }

        Ok(record.clone())
    }
}
