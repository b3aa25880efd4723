//! Drives a board against the seeded in-memory store: places an order,
//! walks it to pickup, and prints what a subscriber sees along the way.
//!
//! ```sh
//! cargo run --example board_demo
//! ```

use pickup_board::prelude::*;

fn print_columns(snapshot: &BoardSnapshot) {
    println!("-- board revision {} --", snapshot.revision);
    for status in [OrderStatus::New, OrderStatus::Preparing, OrderStatus::Ready] {
        let views = snapshot.orders_in(status);
        println!("  {} ({})", status, views.len());
        for view in views {
            let marker = if view.pending_transition.is_some() {
                " [confirming...]"
            } else {
                ""
            };
            println!(
                "    {} {} ({:.2}){}",
                view.order.display_number, view.order.customer.name, view.order.total_amount, marker
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pickup_board=debug".into()),
        )
        .init();

    let store = Arc::new(InMemoryOrderStore::with_demo_orders());
    let handle = PickupBoard::init(store, BoardConfig::default());

    // Wait for the initial refresh to land
    let mut rx = handle.subscribe();
    while rx.borrow().orders.is_empty() {
        rx.changed().await?;
    }
    print_columns(&rx.borrow().clone());

    // A customer places an order
    let order = handle
        .place_order(NewOrder {
            customer: CustomerInput {
                name: "Grace Hopper".to_string(),
                phone: "555-7777".to_string(),
                email: Some("grace@example.com".to_string()),
            },
            items: vec![
                OrderItem::new("Chicken Sandwich", 1, 9.00),
                OrderItem::new("Onion Rings", 2, 4.00),
            ],
        })
        .await?;
    println!("\nplaced {} for {}", order.display_number, order.customer.name);
    print_columns(&handle.snapshot());

    // Staff drags it across the board
    let before_ready = handle.snapshot();
    handle
        .request_transition(order.id, OrderStatus::Preparing)
        .await?;
    handle.request_transition(order.id, OrderStatus::Ready).await?;

    // The ready-diff is what a notification observer would play a sound on
    let after_ready = handle.snapshot();
    for view in after_ready.newly_ready_since(&before_ready) {
        println!("\n*ding* {} is ready for pickup", view.order.display_number);
    }
    print_columns(&after_ready);

    // Moving backward is refused
    match handle
        .request_transition(order.id, OrderStatus::Preparing)
        .await
    {
        Err(e) => println!("\nrefused as expected: {}", e),
        Ok(()) => unreachable!("backward transition must be refused"),
    }

    // Customer collects
    handle
        .request_transition(order.id, OrderStatus::PickedUp)
        .await?;
    println!(
        "\n{} picked up, {} open orders left",
        order.display_number,
        handle
            .snapshot()
            .orders
            .iter()
            .filter(|view| view.order.is_open())
            .count()
    );

    handle.dispose();
    Ok(())
}
