//! Integration tests for the full order lifecycle
//!
//! Walks an order from placement to pickup the way the staff board and the
//! public ready board drive it, observing everything through snapshot
//! subscriptions only.

use pickup_board::prelude::*;
use std::sync::Arc;

fn board_with_store() -> (Arc<PickupBoard>, Arc<InMemoryOrderStore>) {
    let store = Arc::new(InMemoryOrderStore::new());
    let board = PickupBoard::new(store.clone(), BoardConfig::default());
    (board, store)
}

fn placement(name: &str, phone: &str, items: Vec<OrderItem>) -> NewOrder {
    NewOrder {
        customer: CustomerInput {
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
        },
        items,
    }
}

#[tokio::test]
async fn test_placement_to_pickup_walk() {
    let (board, _store) = board_with_store();

    let order = board
        .place_order(placement(
            "Alice Smith",
            "555-1234",
            vec![
                OrderItem::new("Classic Burger", 1, 8.50),
                OrderItem::new("Coke", 2, 2.00),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::New);
    assert_eq!(order.total_amount, 12.50);
    assert_eq!(board.snapshot().count_in(OrderStatus::New), 1);

    // Kitchen starts, finishes, customer collects
    for target in [
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::PickedUp,
    ] {
        board.request_transition(order.id, target).await.unwrap();
        assert_eq!(board.get_order(&order.id).unwrap().order.status, target);
    }

    // Terminal: nothing further is accepted, not even cancellation
    for target in OrderStatus::ALL {
        assert!(
            board.request_transition(order.id, target).await.is_err(),
            "picked-up order accepted a transition to {}",
            target
        );
    }
}

#[tokio::test]
async fn test_cancellation_from_each_open_stage() {
    let (board, _store) = board_with_store();

    for stage in [OrderStatus::New, OrderStatus::Preparing, OrderStatus::Ready] {
        let order = board
            .place_order(placement(
                "Bob Johnson",
                "555-5678",
                vec![OrderItem::new("Large Pizza", 1, 16.0)],
            ))
            .await
            .unwrap();

        // Advance to the stage under test
        let path: &[OrderStatus] = match stage {
            OrderStatus::New => &[],
            OrderStatus::Preparing => &[OrderStatus::Preparing],
            _ => &[OrderStatus::Preparing, OrderStatus::Ready],
        };
        for target in path {
            board.request_transition(order.id, *target).await.unwrap();
        }

        board
            .request_transition(order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(
            board.get_order(&order.id).unwrap().order.status,
            OrderStatus::Cancelled
        );
    }
}

#[tokio::test]
async fn test_ready_diff_drives_pickup_notification() {
    let (board, _store) = board_with_store();

    let order = board
        .place_order(placement(
            "Charlie Brown",
            "555-9012",
            vec![OrderItem::new("Chicken Sandwich", 1, 9.0)],
        ))
        .await
        .unwrap();
    board
        .request_transition(order.id, OrderStatus::Preparing)
        .await
        .unwrap();

    // The sound-trigger observer keeps its previous snapshot and diffs
    let before = board.snapshot();
    board
        .request_transition(order.id, OrderStatus::Ready)
        .await
        .unwrap();
    let after = board.snapshot();

    let newly_ready = after.newly_ready_since(&before);
    assert_eq!(newly_ready.len(), 1);
    assert_eq!(newly_ready[0].order.id, order.id);

    // Same snapshot again: no re-trigger
    assert!(after.newly_ready_since(&after).is_empty());
}

#[tokio::test]
async fn test_track_order_by_display_number() {
    let (board, _store) = board_with_store();

    let order = board
        .place_order(placement(
            "Diana Prince",
            "555-2468",
            vec![OrderItem::new("Tacos", 3, 3.50)],
        ))
        .await
        .unwrap();

    let snapshot = board.snapshot();
    let found = snapshot
        .find_by_display_number(&order.display_number)
        .unwrap();
    assert_eq!(found.order.id, order.id);

    // Customers type the number without the hash prefix
    let bare = order.display_number.trim_start_matches('#');
    assert!(snapshot.find_by_display_number(bare).is_some());
    assert!(snapshot.find_by_display_number("#zzzzzzzz").is_none());
}

#[tokio::test]
async fn test_admin_edit_corrects_details_without_transition() {
    let (board, store) = board_with_store();

    let order = board
        .place_order(placement(
            "Eve Adams",
            "555-3333",
            vec![OrderItem::new("Vegan Bowl", 1, 11.0)],
        ))
        .await
        .unwrap();

    // Staff corrects the customer phone through the full-record edit path
    let mut record = store
        .fetch_all()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.id == order.id)
        .unwrap();
    if let Some(customer) = &mut record.customers {
        customer.phone = Some("555-0000".to_string());
    }
    let edited = board.admin_edit(record).await.unwrap();

    // Content changed, status untouched
    assert_eq!(edited.customer.phone, "555-0000");
    assert_eq!(edited.status, OrderStatus::New);
    assert_eq!(
        board.get_order(&order.id).unwrap().order.customer.phone,
        "555-0000"
    );
}

#[tokio::test]
async fn test_degraded_record_still_reaches_the_board() {
    let (board, store) = board_with_store();

    let order = board
        .place_order(placement(
            "Frank White",
            "555-4444",
            vec![OrderItem::new("Large Pizza", 1, 16.0)],
        ))
        .await
        .unwrap();

    // Corrupt the persisted items blob, as a bad migration might
    let mut record = store
        .fetch_all()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.id == order.id)
        .unwrap();
    record.items = Some(serde_json::json!("{{not json"));
    store.update_order(record).await.unwrap();

    board.refresh_once().await.unwrap();
    let view = board.get_order(&order.id).unwrap();
    assert!(view.order.items.is_empty());
    assert!(view.order.diagnostics.items_unparseable);
    // The persisted total survives even though items are gone
    assert_eq!(view.order.total_amount, 16.0);
}

#[tokio::test]
async fn test_column_counts_follow_transitions() {
    let (board, _store) = board_with_store();

    let mut ids = Vec::new();
    for i in 0..3 {
        let order = board
            .place_order(placement(
                "Heidi Klum",
                &format!("555-000{}", i),
                vec![OrderItem::new("Fries", 1, 3.25)],
            ))
            .await
            .unwrap();
        ids.push(order.id);
    }
    assert_eq!(board.snapshot().count_in(OrderStatus::New), 3);

    board
        .request_transition(ids[0], OrderStatus::Preparing)
        .await
        .unwrap();
    board
        .request_transition(ids[1], OrderStatus::Cancelled)
        .await
        .unwrap();

    let snapshot = board.snapshot();
    assert_eq!(snapshot.count_in(OrderStatus::New), 1);
    assert_eq!(snapshot.count_in(OrderStatus::Preparing), 1);
    assert_eq!(snapshot.count_in(OrderStatus::Cancelled), 1);
}
