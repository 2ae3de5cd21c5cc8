use kasir_app::{AppStore, JsonFileStore, ReceiptRenderer, setup_environment};

/// Print the receipt for an order (the newest one when no id is given)
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (dotenv, config, logging)
    let config = setup_environment();

    // 2. Load state
    let store = AppStore::open(JsonFileStore::new(config.data_dir.clone()))?;
    tracing::info!(
        restaurant = %store.settings().restaurant_name,
        orders = store.orders().len(),
        low_stock = store.low_stock().len(),
        "Store opened"
    );

    // 3. Render the receipt
    let order_id = std::env::args().nth(1);
    let order = match order_id.as_deref() {
        Some(id) => store.order(id),
        None => store.orders().first(),
    };
    match order {
        Some(order) => {
            let settings = store.settings().receipt_settings();
            println!("{}", ReceiptRenderer::new(order, &settings).render());
        }
        None => tracing::warn!(order_id = ?order_id, "No order to print"),
    }

    Ok(())
}
