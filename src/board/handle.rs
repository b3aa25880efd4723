//! Lifecycle handle for a running board instance

use crate::board::service::PickupBoard;
use std::ops::Deref;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Owns a board and its background refresh loop.
///
/// Obtained from [`PickupBoard::init`]. The handle dereferences to the
/// board, so observers and initiators can use it directly; clone the inner
/// `Arc` via [`BoardHandle::board`] to share it with the UI tree. Dropping
/// the handle stops the refresh loop. In-flight confirmation requests are
/// unaffected and complete on their own callers.
pub struct BoardHandle {
    board: Arc<PickupBoard>,
    refresh_task: JoinHandle<()>,
}

impl BoardHandle {
    pub(crate) fn new(board: Arc<PickupBoard>, refresh_task: JoinHandle<()>) -> Self {
        Self {
            board,
            refresh_task,
        }
    }

    /// Shared reference to the board for injection into UI owners
    pub fn board(&self) -> Arc<PickupBoard> {
        self.board.clone()
    }

    /// Stop the refresh loop and release the board.
    ///
    /// Equivalent to dropping the handle; provided for call sites that want
    /// the teardown to be explicit.
    pub fn dispose(self) {
        self.refresh_task.abort();
    }
}

impl Deref for BoardHandle {
    type Target = PickupBoard;

    fn deref(&self) -> &PickupBoard {
        &self.board
    }
}

impl Drop for BoardHandle {
    fn drop(&mut self) {
        self.refresh_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::storage::InMemoryOrderStore;

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_refresh_loop() {
        let store = Arc::new(InMemoryOrderStore::with_demo_orders());
        let handle = PickupBoard::init(store, BoardConfig::default());
        let board = handle.board();

        // Let the initial refresh land
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let revision = board.snapshot().revision;
        assert!(revision > 0);

        handle.dispose();

        // Several poll intervals later, no further refresh has landed
        tokio::time::sleep(std::time::Duration::from_secs(120)).await;
        assert_eq!(board.snapshot().revision, revision);
    }

    #[tokio::test]
    async fn test_handle_derefs_to_board() {
        let store = Arc::new(InMemoryOrderStore::with_demo_orders());
        let handle = PickupBoard::init(store, BoardConfig::default());

        // Deref gives direct access to board methods
        let _rx = handle.subscribe();
        assert!(handle.get_order(&uuid::Uuid::new_v4()).is_none());
    }
}
