//! The board service: transition initiation and store synchronization
//!
//! `PickupBoard` owns the order cache and is the only thing that mutates
//! it. UI layers (columns, cards, counters, the admin table) determine
//! *what* the user wants (which order, which target column) and call
//! [`PickupBoard::request_transition`]; they never embed transition logic
//! themselves. Observers consume snapshots from the hub and hold no other
//! reference to board state.
//!
//! # Synchronization
//!
//! Two independent flows touch the cache:
//!
//! - the periodic refresh loop fetches the full authoritative collection
//!   and reconciles it against outstanding optimistic transitions;
//! - each transition request applies an optimistic mutation, then issues a
//!   bounded confirmation request and settles or reverts on its outcome.
//!
//! Both are idempotent with respect to re-applying the same target status,
//! so their interleaving never loses or duplicates user intent. Cache
//! mutations happen under a short-lived lock that is never held across an
//! await; every mutation path ends in exactly one hub publication.

use crate::board::handle::BoardHandle;
use crate::config::BoardConfig;
use crate::core::cache::{OrderCache, ReplaceReport};
use crate::core::error::{BoardError, BoardResult, SyncError, TransitionError};
use crate::core::hub::{BoardSnapshot, OrderView, SnapshotHub};
use crate::core::order::{NewOrder, Order};
use crate::core::projection::{RawOrderRecord, project, project_all};
use crate::core::service::OrderStore;
use crate::core::status::OrderStatus;
use crate::core::validation::validate_new_order;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

/// Constructed board instance owning the cache, the hub and the store
/// handle.
///
/// Create one per client via [`PickupBoard::init`] and inject it into
/// whatever owns the UI tree; there is deliberately no process-wide
/// singleton.
pub struct PickupBoard {
    store: Arc<dyn OrderStore>,
    cache: Mutex<OrderCache>,
    hub: SnapshotHub,
    config: BoardConfig,
}

impl PickupBoard {
    /// Create a board without starting the refresh loop.
    ///
    /// Most callers want [`PickupBoard::init`]; this constructor exists for
    /// tests and for hosts that drive [`PickupBoard::refresh_once`] on
    /// their own schedule.
    pub fn new(store: Arc<dyn OrderStore>, config: BoardConfig) -> Arc<Self> {
        Arc::new(Self {
            store,
            cache: Mutex::new(OrderCache::new(config.max_stale_refreshes)),
            hub: SnapshotHub::new(),
            config,
        })
    }

    /// Create a board and spawn its refresh loop.
    ///
    /// The loop performs an initial fetch immediately, then refreshes every
    /// `config.poll_interval_secs`. Dropping (or disposing) the returned
    /// handle stops the loop.
    pub fn init(store: Arc<dyn OrderStore>, config: BoardConfig) -> BoardHandle {
        let board = Self::new(store, config);
        let refresh_task = tokio::spawn({
            let board = board.clone();
            async move { board.run_refresh_loop().await }
        });
        BoardHandle::new(board, refresh_task)
    }

    fn cache(&self) -> BoardResult<MutexGuard<'_, OrderCache>> {
        self.cache
            .lock()
            .map_err(|e| BoardError::Internal(format!("cache lock poisoned: {}", e)))
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Subscribe to board snapshots.
    ///
    /// The receiver's current value is the present snapshot, so there is no
    /// missed-update window between subscribing and the first mutation.
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.hub.subscribe()
    }

    /// Subscribe as a `Stream` whose first item is the current snapshot
    pub fn subscribe_stream(&self) -> WatchStream<BoardSnapshot> {
        self.hub.subscribe_stream()
    }

    /// The latest published snapshot
    pub fn snapshot(&self) -> BoardSnapshot {
        self.hub.latest()
    }

    /// Look up a single order for detail views
    pub fn get_order(&self, id: &Uuid) -> Option<OrderView> {
        self.snapshot().get(id).cloned()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Move an order to a target status.
    ///
    /// The optimistic move is visible to subscribers before the store
    /// round-trip completes; the returned future resolves with the
    /// confirmation outcome. On failure or timeout the move is reverted and
    /// the board shows the last known authoritative status again.
    ///
    /// Errors: `InvalidTransition` (no mutation happened), `ConflictBusy`
    /// (a transition is already pending on this order), `UnknownOrder`,
    /// `ConfirmationFailed` (reverted; retryable).
    pub async fn request_transition(&self, id: Uuid, target: OrderStatus) -> BoardResult<()> {
        let from = {
            let mut cache = self.cache()?;

            let entry = cache
                .get(&id)
                .ok_or(TransitionError::UnknownOrder { id })?;
            let from = entry.order.status;
            if let Some(pending) = entry.pending_target() {
                return Err(TransitionError::ConflictBusy { id, pending }.into());
            }
            if !from.can_transition_to(target) {
                return Err(TransitionError::InvalidTransition { from, to: target }.into());
            }

            cache.apply_optimistic(id, target)?;
            self.hub.publish(cache.snapshot());
            from
        };

        tracing::debug!(
            order_id = %id,
            from = %from,
            to = %target,
            "optimistic transition applied, awaiting confirmation"
        );

        let outcome = tokio::time::timeout(
            self.config.confirmation_timeout(),
            self.store.update_status(&id, target),
        )
        .await;

        match outcome {
            Ok(Ok(_record)) => {
                let mut cache = self.cache()?;
                cache.confirm(id, target);
                self.hub.publish(cache.snapshot());
                tracing::info!(order_id = %id, from = %from, to = %target, "transition confirmed");
                Ok(())
            }
            Ok(Err(e)) => self.revert_transition(id, target, e.to_string()),
            // The timed-out request future is dropped here, so a late
            // success cannot land after the revert and resurrect the intent
            Err(_) => self.revert_transition(id, target, "confirmation timed out".to_string()),
        }
    }

    fn revert_transition(&self, id: Uuid, target: OrderStatus, message: String) -> BoardResult<()> {
        {
            let mut cache = self.cache()?;
            cache.reject(id);
            self.hub.publish(cache.snapshot());
        }
        tracing::warn!(
            order_id = %id,
            target = %target,
            error = %message,
            "transition confirmation failed, optimistic move reverted"
        );
        Err(SyncError::ConfirmationFailed {
            id,
            target,
            message,
        }
        .into())
    }

    // =========================================================================
    // Synchronization
    // =========================================================================

    /// Fetch the authoritative order collection and reconcile it into the
    /// cache.
    ///
    /// On fetch failure the cache is left untouched and `RefreshFailed` is
    /// returned; the caller (typically the loop) retries on the next tick.
    pub async fn refresh_once(&self) -> BoardResult<ReplaceReport> {
        let raw = self.store.fetch_all().await.map_err(|e| SyncError::RefreshFailed {
            message: e.to_string(),
        })?;
        let orders = project_all(&raw);

        let (report, revision) = {
            let mut cache = self.cache()?;
            let report = cache.replace_all(orders);
            let snapshot = cache.snapshot();
            let revision = snapshot.revision;
            self.hub.publish(snapshot);
            (report, revision)
        };

        for (order_id, adopted) in &report.force_resolved {
            let stuck = SyncError::StuckTransition {
                id: *order_id,
                adopted: *adopted,
            };
            tracing::warn!(order_id = %order_id, code = stuck.error_code(), "{}", stuck);
        }
        for order_id in &report.evicted_pending {
            tracing::warn!(
                order_id = %order_id,
                "order with pending transition vanished from the store"
            );
        }
        tracing::debug!(count = raw.len(), revision, "orders refreshed");

        Ok(report)
    }

    /// Drive periodic refreshes until the task is aborted.
    ///
    /// The first tick fires immediately; failures are logged and the loop
    /// stays on schedule.
    pub async fn run_refresh_loop(&self) {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = self.refresh_once().await {
                tracing::warn!(error = %e, "scheduled refresh failed, keeping previous state");
            }
        }
    }

    // =========================================================================
    // Placement and administrative edits
    // =========================================================================

    /// Validate and create a new order, then refresh so the board shows it.
    pub async fn place_order(&self, input: NewOrder) -> BoardResult<Order> {
        validate_new_order(&input)?;

        let record = self
            .store
            .create_order(input)
            .await
            .map_err(|e| BoardError::Internal(format!("order creation failed: {}", e)))?;
        let order = project(&record);

        tracing::info!(
            order_id = %order.id,
            display_number = %order.display_number,
            total = order.total_amount,
            "order placed"
        );

        self.refresh_once().await?;
        Ok(order)
    }

    /// Replace a full order record, bypassing transition validation.
    ///
    /// This is the administrative override for staff correcting customer or
    /// item details. It may change the status without a legal edge, which
    /// is why it is logged distinctly from validator-approved transitions.
    pub async fn admin_edit(&self, record: RawOrderRecord) -> BoardResult<Order> {
        let order_id = record.id;
        let updated = self
            .store
            .update_order(record)
            .await
            .map_err(|e| BoardError::Internal(format!("order edit failed: {}", e)))?;
        let order = project(&updated);

        tracing::info!(
            order_id = %order_id,
            status = %order.status,
            audit = "admin_override",
            "order record edited administratively"
        );

        self.refresh_once().await?;
        Ok(order)
    }
}
