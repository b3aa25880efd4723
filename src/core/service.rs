//! Service trait for the order store collaborator
//!
//! The order store is the source of truth for orders. The board never
//! assumes anything about the backing implementation beyond this contract:
//! a hosted relational store, a REST facade, or an in-memory map for tests
//! are all interchangeable.

use crate::core::order::{CustomerInput, NewOrder};
use crate::core::projection::{RawCustomerRecord, RawOrderRecord};
use crate::core::status::OrderStatus;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Authoritative persistence for orders.
///
/// Records cross this boundary in their raw persisted shape; normalization
/// into board orders happens in the projection layer, never here.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fetch the full order collection (read-all, no pagination contract)
    async fn fetch_all(&self) -> Result<Vec<RawOrderRecord>>;

    /// Set an order's status.
    ///
    /// Must be safely repeatable with the same target status: the periodic
    /// refresh and the explicit confirmation path may both apply it.
    async fn update_status(&self, id: &Uuid, status: OrderStatus) -> Result<RawOrderRecord>;

    /// Create a new order in status New with a store-assigned id
    async fn create_order(&self, order: NewOrder) -> Result<RawOrderRecord>;

    /// Replace a full order record.
    ///
    /// This is the administrative edit path: it may change any field,
    /// including the status, without transition validation. Callers are
    /// responsible for making such edits auditable.
    async fn update_order(&self, record: RawOrderRecord) -> Result<RawOrderRecord>;

    /// Create a customer record, or return the existing one for the same
    /// phone number
    async fn upsert_customer(&self, customer: CustomerInput) -> Result<RawCustomerRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // The trait compiles and can be used as a shared object
    #[allow(dead_code)]
    async fn generic_fetch(store: &dyn OrderStore) -> Result<Vec<RawOrderRecord>> {
        store.fetch_all().await
    }

    #[test]
    fn test_trait_is_object_safe() {
        fn assert_object_safe(_: Option<&dyn OrderStore>) {}
        assert_object_safe(None);
    }
}
