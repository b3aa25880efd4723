//! Core module containing the order domain, cache and notification types

pub mod cache;
pub mod error;
pub mod hub;
pub mod order;
pub mod projection;
pub mod service;
pub mod status;
pub mod validation;

pub use cache::{CachedOrder, OrderCache, ReplaceReport, SyncState};
pub use error::{BoardError, BoardResult, ConfigError, SyncError, TransitionError};
pub use hub::{BoardSnapshot, OrderView, SnapshotHub};
pub use order::{CustomerInput, CustomerSnapshot, NewOrder, Order, OrderItem};
pub use projection::{RawCustomerRecord, RawOrderRecord, project, project_all};
pub use service::OrderStore;
pub use status::OrderStatus;
pub use validation::{FieldIssue, validate_new_order};
