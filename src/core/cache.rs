//! Client-side order cache with optimistic transitions and reconciliation
//!
//! The cache is the single shared mutable resource of the board. It maps
//! order id → order plus a small per-order synchronization state machine:
//!
//! ```text
//! SyncState::Settled ──apply_optimistic──▶ SyncState::Pending { target }
//!          ▲                                        │
//!          ├──────── confirm(target) ───────────────┤
//!          ├──────── reject() ──────────────────────┤
//!          └──────── replace_all reconciliation ────┘
//! ```
//!
//! `Pending` means the board already shows the target status while the
//! store confirmation is still in flight. At most one transition may be
//! pending per order; a second request is refused with `ConflictBusy`
//! rather than stacking conflicting intents.
//!
//! The cache itself is pure state: it never performs I/O and never fires
//! notifications. The owning board service serializes mutations and
//! publishes exactly one snapshot per mutation path, which keeps the shared
//! state and the observable state from diverging.

use crate::core::error::TransitionError;
use crate::core::hub::{BoardSnapshot, OrderView};
use crate::core::order::Order;
use crate::core::status::OrderStatus;
use chrono::Utc;
use indexmap::IndexMap;
use uuid::Uuid;

/// Per-order synchronization state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// The cached order matches the last known authoritative state
    Settled,
    /// An optimistic transition is awaiting store confirmation
    Pending {
        /// The status the board already displays
        target: OrderStatus,
        /// How many consecutive refreshes contradicted this transition
        stale_refreshes: u8,
    },
}

/// A cached order together with its synchronization state.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedOrder {
    pub order: Order,
    pub sync: SyncState,
}

impl CachedOrder {
    fn settled(order: Order) -> Self {
        Self {
            order,
            sync: SyncState::Settled,
        }
    }

    /// Target of the pending transition, if one is outstanding
    pub fn pending_target(&self) -> Option<OrderStatus> {
        match self.sync {
            SyncState::Settled => None,
            SyncState::Pending { target, .. } => Some(target),
        }
    }

    fn to_view(&self) -> OrderView {
        OrderView {
            order: self.order.clone(),
            pending_transition: self.pending_target(),
        }
    }
}

/// What a [`OrderCache::replace_all`] reconciliation did beyond plain
/// adoption. The board service surfaces these to the user.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplaceReport {
    /// Pending transitions the refresh itself confirmed (incoming status
    /// already matched the optimistic target)
    pub confirmed: Vec<Uuid>,

    /// Stuck transitions force-resolved to the incoming authoritative
    /// status after too many contradicting refreshes
    pub force_resolved: Vec<(Uuid, OrderStatus)>,

    /// Orders evicted while a transition was still pending (the order
    /// vanished from the authoritative read-all)
    pub evicted_pending: Vec<Uuid>,
}

impl ReplaceReport {
    /// True when the reconciliation was pure adoption
    pub fn is_clean(&self) -> bool {
        self.confirmed.is_empty()
            && self.force_resolved.is_empty()
            && self.evicted_pending.is_empty()
    }
}

/// In-memory mapping of order id → cached order.
///
/// Iteration order follows the most recent authoritative fetch, which
/// returns newest-first; snapshots re-sort defensively on `created_at`.
#[derive(Debug)]
pub struct OrderCache {
    orders: IndexMap<Uuid, CachedOrder>,
    revision: u64,
    max_stale_refreshes: u8,
}

impl OrderCache {
    /// Create an empty cache.
    ///
    /// `max_stale_refreshes` bounds how many consecutive refreshes may
    /// contradict a pending transition before it is force-resolved to the
    /// authoritative status.
    pub fn new(max_stale_refreshes: u8) -> Self {
        Self {
            orders: IndexMap::new(),
            revision: 0,
            max_stale_refreshes,
        }
    }

    /// Merge a fresh authoritative fetch into the cache.
    ///
    /// Per-order reconciliation:
    /// 1. no pending transition → the incoming record wins outright;
    /// 2. pending target equals the incoming status → the refresh confirmed
    ///    the transition; clear it and adopt the record;
    /// 3. pending target differs → the optimistic edit has not landed yet;
    ///    keep the pending transition and the local status, adopt all
    ///    non-status fields, and count the contradiction. After
    ///    `max_stale_refreshes` contradictions the transition is stuck and
    ///    the incoming status is adopted.
    ///
    /// Orders absent from the incoming collection are evicted: the read-all
    /// refresh is authoritative for existence.
    pub fn replace_all(&mut self, incoming: Vec<Order>) -> ReplaceReport {
        let mut report = ReplaceReport::default();
        let mut next: IndexMap<Uuid, CachedOrder> = IndexMap::with_capacity(incoming.len());

        for fresh in incoming {
            let id = fresh.id;
            let entry = match self.orders.shift_remove(&id) {
                None => CachedOrder::settled(fresh),
                Some(existing) => match existing.sync {
                    SyncState::Settled => CachedOrder::settled(fresh),
                    SyncState::Pending {
                        target,
                        stale_refreshes,
                    } => {
                        if fresh.status == target {
                            // The refresh itself confirmed the transition
                            report.confirmed.push(id);
                            CachedOrder::settled(fresh)
                        } else {
                            let stale_refreshes = stale_refreshes.saturating_add(1);
                            if stale_refreshes >= self.max_stale_refreshes {
                                report.force_resolved.push((id, fresh.status));
                                CachedOrder::settled(fresh)
                            } else {
                                // Keep the optimistic status visible; adopt
                                // everything else from the incoming record
                                let mut order = fresh;
                                order.status = existing.order.status;
                                CachedOrder {
                                    order,
                                    sync: SyncState::Pending {
                                        target,
                                        stale_refreshes,
                                    },
                                }
                            }
                        }
                    }
                },
            };
            next.insert(id, entry);
        }

        for (id, dropped) in self.orders.drain(..) {
            if dropped.pending_target().is_some() {
                report.evicted_pending.push(id);
            }
        }

        self.orders = next;
        self.revision += 1;
        report
    }

    /// Record an optimistic transition on an order.
    ///
    /// The caller must have validated the edge already. The cache only
    /// enforces existence and the single-pending invariant, then makes the
    /// target status visible immediately.
    pub fn apply_optimistic(
        &mut self,
        id: Uuid,
        target: OrderStatus,
    ) -> Result<(), TransitionError> {
        let entry = self
            .orders
            .get_mut(&id)
            .ok_or(TransitionError::UnknownOrder { id })?;

        if let Some(pending) = entry.pending_target() {
            return Err(TransitionError::ConflictBusy { id, pending });
        }

        entry.sync = SyncState::Pending {
            target,
            stale_refreshes: 0,
        };
        self.revision += 1;
        Ok(())
    }

    /// Settle an order on its confirmed target status.
    ///
    /// Idempotent: re-confirming an already settled order on the same
    /// status changes nothing. Returns whether any state changed.
    pub fn confirm(&mut self, id: Uuid, target: OrderStatus) -> bool {
        let Some(entry) = self.orders.get_mut(&id) else {
            // Evicted between request and confirmation; the next refresh
            // owns the truth
            return false;
        };

        if entry.sync == SyncState::Settled && entry.order.status == target {
            return false;
        }

        entry.order.status = target;
        entry.order.touch();
        entry.sync = SyncState::Settled;
        self.revision += 1;
        true
    }

    /// Revert an optimistic transition, leaving the authoritative status
    /// untouched. Returns whether a pending transition was cleared.
    pub fn reject(&mut self, id: Uuid) -> bool {
        let Some(entry) = self.orders.get_mut(&id) else {
            return false;
        };

        if entry.pending_target().is_none() {
            return false;
        }

        entry.sync = SyncState::Settled;
        self.revision += 1;
        true
    }

    /// Look up a cached order
    pub fn get(&self, id: &Uuid) -> Option<&CachedOrder> {
        self.orders.get(id)
    }

    /// The status currently shown on the board for an order
    pub fn visible_status(&self, id: &Uuid) -> Option<OrderStatus> {
        self.orders
            .get(id)
            .map(|entry| entry.pending_target().unwrap_or(entry.order.status))
    }

    /// Number of cached orders
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Monotonic mutation counter; snapshots carry it
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Build the full snapshot observers receive, newest order first.
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut orders: Vec<OrderView> = self.orders.values().map(CachedOrder::to_view).collect();
        orders.sort_by(|a, b| {
            b.order
                .created_at
                .cmp(&a.order.created_at)
                .then_with(|| a.order.id.cmp(&b.order.id))
        });

        BoardSnapshot {
            revision: self.revision,
            generated_at: Utc::now(),
            orders,
        }
    }
}
