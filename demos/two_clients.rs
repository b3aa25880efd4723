//! Two board clients sharing one store: an optimistic move on one client
//! becomes visible on the other through its periodic refresh.
//!
//! ```sh
//! cargo run --example two_clients
//! ```

use pickup_board::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pickup_board=info".into()),
        )
        .init();

    let store = Arc::new(InMemoryOrderStore::new());

    // Fast polling so the demo converges quickly
    let config = BoardConfig {
        poll_interval_secs: 1,
        ..BoardConfig::default()
    };
    let kitchen = PickupBoard::init(store.clone(), config.clone());
    let counter = PickupBoard::init(store, config);

    let order = kitchen
        .place_order(NewOrder {
            customer: CustomerInput {
                name: "Alice Smith".to_string(),
                phone: "555-1234".to_string(),
                email: None,
            },
            items: vec![OrderItem::new("Classic Burger", 1, 8.50)],
        })
        .await?;
    println!("kitchen placed {}", order.display_number);

    // The counter client learns about the order from its own refresh
    let mut counter_rx = counter.subscribe();
    while counter_rx.borrow().get(&order.id).is_none() {
        counter_rx.changed().await?;
    }
    println!("counter sees {} as New", order.display_number);

    // Kitchen starts cooking; its own board updates instantly
    kitchen
        .request_transition(order.id, OrderStatus::Preparing)
        .await?;
    println!("kitchen moved it to Preparing");

    // The counter converges within one refresh cycle
    while counter_rx.borrow().get(&order.id).unwrap().order.status != OrderStatus::Preparing {
        counter_rx.changed().await?;
    }
    println!("counter converged to Preparing");

    kitchen.dispose();
    counter.dispose();
    Ok(())
}
