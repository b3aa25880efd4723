//! Snapshot hub for real-time board notifications
//!
//! The hub is the single observation point for board state. Every cache
//! mutation ends in one [`SnapshotHub::publish`] call, and every observer
//! (board columns, counters, sound triggers, the admin table) consumes the
//! same full [`BoardSnapshot`] rather than polling the cache.
//!
//! # Architecture
//!
//! ```text
//! refresh loop ────┐
//!                  ├──▶ SnapshotHub::publish() ──▶ watch channel ──▶ column renderers
//! transition path ─┘                                             ──▶ counters / sound triggers
//! ```
//!
//! Observers receive the full current snapshot, not a diff: the open-order
//! collection is tens to low hundreds of entries, so simplicity wins over
//! delta encoding. The channel is `tokio::sync::watch`, which always holds
//! the latest snapshot: a new subscriber sees the current state immediately,
//! with no missed-update window between subscribing and the first mutation.

use crate::core::order::Order;
use crate::core::status::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

/// One order as observers see it: the authoritative order plus any
/// outstanding optimistic transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    /// The last known authoritative order
    pub order: Order,

    /// Target of an optimistic transition awaiting confirmation, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_transition: Option<OrderStatus>,
}

impl OrderView {
    /// The status the board displays: the optimistic target while a
    /// transition is in flight, the authoritative status otherwise.
    pub fn visible_status(&self) -> OrderStatus {
        self.pending_transition.unwrap_or(self.order.status)
    }
}

/// Full board state at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Monotonic sequence number; bumped on every cache mutation
    pub revision: u64,

    /// When this snapshot was generated
    pub generated_at: DateTime<Utc>,

    /// All cached orders, newest first
    pub orders: Vec<OrderView>,
}

impl BoardSnapshot {
    /// The snapshot a hub starts with before any refresh has landed
    pub fn empty() -> Self {
        Self {
            revision: 0,
            generated_at: Utc::now(),
            orders: Vec::new(),
        }
    }

    /// Look up a single order by id
    pub fn get(&self, id: &Uuid) -> Option<&OrderView> {
        self.orders.iter().find(|view| &view.order.id == id)
    }

    /// Orders currently displayed in the given column
    pub fn orders_in(&self, status: OrderStatus) -> Vec<&OrderView> {
        self.orders
            .iter()
            .filter(|view| view.visible_status() == status)
            .collect()
    }

    /// Column counter for the given status
    pub fn count_in(&self, status: OrderStatus) -> usize {
        self.orders
            .iter()
            .filter(|view| view.visible_status() == status)
            .count()
    }

    /// Look up an order by its human-facing display number.
    ///
    /// Matching ignores a leading `#`, so `1f3a9b2c` finds `#1f3a9b2c`.
    pub fn find_by_display_number(&self, number: &str) -> Option<&OrderView> {
        let wanted = number.trim().trim_start_matches('#');
        self.orders
            .iter()
            .find(|view| view.order.display_number.trim_start_matches('#') == wanted)
    }

    /// Orders that are Ready in this snapshot but were not Ready in `prev`.
    ///
    /// This is the trigger set for pickup notifications: the observer keeps
    /// its previous snapshot and diffs on each update.
    pub fn newly_ready_since<'a>(&'a self, prev: &BoardSnapshot) -> Vec<&'a OrderView> {
        let previously_ready: HashSet<Uuid> = prev
            .orders
            .iter()
            .filter(|view| view.visible_status() == OrderStatus::Ready)
            .map(|view| view.order.id)
            .collect();

        self.orders
            .iter()
            .filter(|view| {
                view.visible_status() == OrderStatus::Ready
                    && !previously_ready.contains(&view.order.id)
            })
            .collect()
    }
}

/// Watch-based snapshot hub.
///
/// Cheap to clone and share; the channel always holds the latest snapshot,
/// so subscribing delivers the current board state before any further
/// mutation.
#[derive(Debug, Clone)]
pub struct SnapshotHub {
    tx: watch::Sender<BoardSnapshot>,
}

impl SnapshotHub {
    /// Create a hub holding an empty initial snapshot
    pub fn new() -> Self {
        let (tx, _) = watch::channel(BoardSnapshot::empty());
        Self { tx }
    }

    /// Publish a new snapshot to all subscribers.
    ///
    /// Never fails: with no subscribers the snapshot is simply stored for
    /// the next subscriber to pick up. Returns the number of receivers that
    /// observe the update.
    pub fn publish(&self, snapshot: BoardSnapshot) -> usize {
        self.tx.send_replace(snapshot);
        self.tx.receiver_count()
    }

    /// Subscribe to snapshots.
    ///
    /// The receiver's current value is the present snapshot; await
    /// `changed()` for subsequent updates.
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.tx.subscribe()
    }

    /// Subscribe as a `Stream` whose first item is the current snapshot.
    pub fn subscribe_stream(&self) -> WatchStream<BoardSnapshot> {
        WatchStream::new(self.tx.subscribe())
    }

    /// Clone of the latest published snapshot
    pub fn latest(&self) -> BoardSnapshot {
        self.tx.borrow().clone()
    }

    /// Number of active subscribers (for monitoring)
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SnapshotHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::order::{CustomerSnapshot, OrderItem, ProjectionDiagnostics};
    use tokio_stream::StreamExt;

    fn view(status: OrderStatus, pending: Option<OrderStatus>) -> OrderView {
        let id = Uuid::new_v4();
        let now = Utc::now();
        OrderView {
            order: Order {
                id,
                display_number: Order::display_number_for(&id),
                status,
                customer: CustomerSnapshot::guest(),
                items: vec![OrderItem::new("Coke", 1, 2.0)],
                total_amount: 2.0,
                created_at: now,
                updated_at: now,
                diagnostics: ProjectionDiagnostics::default(),
            },
            pending_transition: pending,
        }
    }

    fn snapshot(revision: u64, orders: Vec<OrderView>) -> BoardSnapshot {
        BoardSnapshot {
            revision,
            generated_at: Utc::now(),
            orders,
        }
    }

    #[test]
    fn test_visible_status_prefers_pending() {
        let settled = view(OrderStatus::New, None);
        assert_eq!(settled.visible_status(), OrderStatus::New);

        let pending = view(OrderStatus::New, Some(OrderStatus::Preparing));
        assert_eq!(pending.visible_status(), OrderStatus::Preparing);
    }

    #[test]
    fn test_orders_in_groups_by_visible_status() {
        let snap = snapshot(
            1,
            vec![
                view(OrderStatus::New, None),
                view(OrderStatus::New, Some(OrderStatus::Preparing)),
                view(OrderStatus::Preparing, None),
            ],
        );

        assert_eq!(snap.count_in(OrderStatus::New), 1);
        assert_eq!(snap.count_in(OrderStatus::Preparing), 2);
        assert_eq!(snap.orders_in(OrderStatus::Ready).len(), 0);
    }

    #[test]
    fn test_find_by_display_number_ignores_hash() {
        let snap = snapshot(1, vec![view(OrderStatus::Ready, None)]);
        let number = snap.orders[0].order.display_number.clone();

        assert!(snap.find_by_display_number(&number).is_some());
        assert!(snap.find_by_display_number(number.trim_start_matches('#')).is_some());
        assert!(snap.find_by_display_number("#00000000").is_none());
    }

    #[test]
    fn test_newly_ready_since_diffs_ready_sets() {
        let steady = view(OrderStatus::Ready, None);
        let prev = snapshot(1, vec![steady.clone(), view(OrderStatus::Preparing, None)]);

        let fresh = view(OrderStatus::Ready, None);
        let next = snapshot(2, vec![steady.clone(), fresh.clone()]);

        let newly = next.newly_ready_since(&prev);
        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].order.id, fresh.order.id);

        // No change, so nothing newly ready
        assert!(next.newly_ready_since(&next).is_empty());
    }

    #[test]
    fn test_subscribe_delivers_current_snapshot_immediately() {
        let hub = SnapshotHub::new();
        hub.publish(snapshot(7, vec![view(OrderStatus::New, None)]));

        // Subscribed after the publish, still sees revision 7 at once
        let rx = hub.subscribe();
        assert_eq!(rx.borrow().revision, 7);
        assert_eq!(rx.borrow().orders.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_notifies_subscribers() {
        let hub = SnapshotHub::new();
        let mut rx = hub.subscribe();
        assert_eq!(rx.borrow().revision, 0);

        let receivers = hub.publish(snapshot(1, vec![]));
        assert_eq!(receivers, 1);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().revision, 1);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_see_same_snapshot() {
        let hub = SnapshotHub::new();
        let mut rx1 = hub.subscribe();
        let mut rx2 = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        hub.publish(snapshot(3, vec![view(OrderStatus::Ready, None)]));

        rx1.changed().await.unwrap();
        rx2.changed().await.unwrap();
        assert_eq!(rx1.borrow().revision, rx2.borrow().revision);
    }

    #[tokio::test]
    async fn test_stream_yields_current_then_updates() {
        let hub = SnapshotHub::new();
        hub.publish(snapshot(1, vec![]));

        let mut stream = hub.subscribe_stream();
        let first = stream.next().await.unwrap();
        assert_eq!(first.revision, 1);

        hub.publish(snapshot(2, vec![]));
        let second = stream.next().await.unwrap();
        assert_eq!(second.revision, 2);
    }

    #[test]
    fn test_publish_without_subscribers_is_stored() {
        let hub = SnapshotHub::new();
        let receivers = hub.publish(snapshot(5, vec![]));
        assert_eq!(receivers, 0);
        assert_eq!(hub.latest().revision, 5);
    }

    #[test]
    fn test_hub_clone_shares_channel() {
        let hub = SnapshotHub::new();
        let _rx = hub.subscribe();

        let hub2 = hub.clone();
        assert_eq!(hub2.subscriber_count(), 1);

        hub2.publish(snapshot(9, vec![]));
        assert_eq!(hub.latest().revision, 9);
    }
}
