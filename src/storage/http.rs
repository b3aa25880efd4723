//! OrderStore backend speaking the REST facade of the hosted store
//!
//! Endpoint shape:
//!
//! ```text
//! GET   {base}/orders              -> { success, data: [RawOrderRecord] }
//! PATCH {base}/orders?id={id}      -> { success, data: RawOrderRecord }   body: {"status": "..."}
//! POST  {base}/orders              -> { success, data: RawOrderRecord }
//! PUT   {base}/orders?id={id}      -> { success, data: RawOrderRecord }   full-record edit
//! POST  {base}/customer            -> { success, data: RawCustomerRecord }
//! ```
//!
//! Responses may or may not be wrapped in the `{success, data}` envelope
//! depending on the deployment; both forms are accepted.

use crate::core::order::{CustomerInput, NewOrder};
use crate::core::projection::{RawCustomerRecord, RawOrderRecord};
use crate::core::service::OrderStore;
use crate::core::status::OrderStatus;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

/// OrderStore implementation over the REST facade
#[derive(Clone)]
pub struct HttpOrderStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderStore {
    /// Create a store client for the given API base URL
    /// (e.g. `http://localhost:3000/api`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await.context("reading response body")?;

        // An HTML body means the endpoint is missing or the server errored
        // before the API layer; surface that instead of a JSON parse error
        if text.trim_start().starts_with("<!DOCTYPE") || text.trim_start().starts_with("<html") {
            bail!("store returned HTML instead of JSON (status {})", status);
        }

        let value: Value =
            serde_json::from_str(&text).with_context(|| format!("invalid JSON: {}", text))?;

        if !status.is_success() {
            let message = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            bail!("store request failed ({}): {}", status, message);
        }

        Ok(value)
    }
}

/// Unwrap the optional `{success, data}` response envelope.
///
/// Plain payloads pass through unchanged; an envelope with `success: false`
/// is an error even on HTTP 200.
fn unwrap_envelope(value: Value) -> Result<Value> {
    let Some(object) = value.as_object() else {
        return Ok(value);
    };

    match object.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(object.get("data").cloned().unwrap_or(Value::Null)),
        Some(false) => {
            let message = object
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            bail!("store reported failure: {}", message)
        }
        None => Ok(value),
    }
}

#[async_trait]
impl OrderStore for HttpOrderStore {
    async fn fetch_all(&self) -> Result<Vec<RawOrderRecord>> {
        let response = self
            .client
            .get(self.url("orders"))
            .send()
            .await
            .context("fetching orders")?;
        let payload = unwrap_envelope(Self::read_json(response).await?)?;
        serde_json::from_value(payload).context("decoding order records")
    }

    async fn update_status(&self, id: &Uuid, status: OrderStatus) -> Result<RawOrderRecord> {
        let response = self
            .client
            .patch(self.url("orders"))
            .query(&[("id", id.to_string())])
            .json(&json!({"status": status.wire_name()}))
            .send()
            .await
            .with_context(|| format!("updating status of order '{}'", id))?;
        let payload = unwrap_envelope(Self::read_json(response).await?)?;
        serde_json::from_value(payload).context("decoding updated order record")
    }

    async fn create_order(&self, order: NewOrder) -> Result<RawOrderRecord> {
        let customer = self.upsert_customer(order.customer.clone()).await?;

        let body = json!({
            "customer_id": customer.id,
            "items": serde_json::to_string(&order.items)?,
            "total_amount": order.total(),
            "status": OrderStatus::New.wire_name(),
        });

        let response = self
            .client
            .post(self.url("orders"))
            .json(&body)
            .send()
            .await
            .context("creating order")?;
        let payload = unwrap_envelope(Self::read_json(response).await?)?;
        serde_json::from_value(payload).context("decoding created order record")
    }

    async fn update_order(&self, record: RawOrderRecord) -> Result<RawOrderRecord> {
        let response = self
            .client
            .put(self.url("orders"))
            .query(&[("id", record.id.to_string())])
            .json(&record)
            .send()
            .await
            .with_context(|| format!("updating order '{}'", record.id))?;
        let payload = unwrap_envelope(Self::read_json(response).await?)?;
        serde_json::from_value(payload).context("decoding updated order record")
    }

    async fn upsert_customer(&self, customer: CustomerInput) -> Result<RawCustomerRecord> {
        let response = self
            .client
            .post(self.url("customer"))
            .json(&customer)
            .send()
            .await
            .context("creating customer")?;
        let payload = unwrap_envelope(Self::read_json(response).await?)?;
        serde_json::from_value(payload).context("decoding customer record")
    }
}
