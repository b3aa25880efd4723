//! # Pickup-Board
//!
//! Order lifecycle management with optimistic, conflict-tolerant board
//! synchronization for restaurant pickup orders.
//!
//! ## Features
//!
//! - **Fixed transition graph**: New → Preparing → Ready → Picked Up, with
//!   cancellation from any non-terminal status; no backward edges
//! - **Optimistic transitions**: the board shows a move immediately, then
//!   settles or reverts on store confirmation
//! - **Conflict-tolerant reconciliation**: periodic authoritative refreshes
//!   merge with in-flight optimistic edits without losing or duplicating
//!   user intent; stuck transitions are force-resolved after a bounded
//!   number of contradicting refreshes
//! - **Snapshot subscriptions**: observers receive the full board state on
//!   every mutation, and the current state immediately on subscribe
//! - **Lenient projection**: malformed persisted records degrade with
//!   diagnostics flags instead of disappearing from the board
//! - **Swappable store backends**: in-memory for tests and development,
//!   REST-backed behind the `http` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pickup_board::prelude::*;
//!
//! // One board instance per client, injected into the UI owner
//! let store = Arc::new(InMemoryOrderStore::with_demo_orders());
//! let handle = PickupBoard::init(store, BoardConfig::default());
//!
//! // Observers react to snapshots; the current one arrives immediately
//! let mut rx = handle.subscribe();
//! let snapshot = rx.borrow().clone();
//! println!("{} orders ready", snapshot.count_in(OrderStatus::Ready));
//!
//! // Drag-and-drop and manual edits both reduce to one call
//! handle.request_transition(order_id, OrderStatus::Preparing).await?;
//!
//! handle.dispose();
//! ```

pub mod board;
pub mod config;
pub mod core;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        cache::{CachedOrder, OrderCache, ReplaceReport, SyncState},
        error::{BoardError, BoardResult, SyncError, TransitionError},
        hub::{BoardSnapshot, OrderView, SnapshotHub},
        order::{CustomerInput, CustomerSnapshot, NewOrder, Order, OrderItem},
        projection::{RawCustomerRecord, RawOrderRecord, project, project_all},
        service::OrderStore,
        status::OrderStatus,
        validation::validate_new_order,
    };

    // === Board ===
    pub use crate::board::{BoardHandle, PickupBoard};

    // === Config ===
    pub use crate::config::BoardConfig;

    // === Storage ===
    #[cfg(feature = "http")]
    pub use crate::storage::HttpOrderStore;
    pub use crate::storage::InMemoryOrderStore;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
