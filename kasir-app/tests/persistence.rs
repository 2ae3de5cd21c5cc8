use kasir_app::{AppStore, JsonFileStore, StoreError};
use shared::models::{OrderCreate, OrderItem, OrderStatus, SettingsUpdate, TableStatus};

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let order_id = {
        let mut store = AppStore::open(JsonFileStore::new(dir.path())).unwrap();
        store
            .update_settings(SettingsUpdate {
                restaurant_name: Some("Warung Bu Sri".to_string()),
                number_of_tables: Some(5),
                ..Default::default()
            })
            .unwrap();
        let order = store
            .add_order(OrderCreate {
                items: vec![OrderItem::new("3", "Sayur Sop", 4, "porsi")],
                table_number: Some("Meja 2".to_string()),
                ..Default::default()
            })
            .unwrap();
        store
            .update_order_status(&order.id, OrderStatus::Completed)
            .unwrap();
        order.id
    };

    let store = AppStore::open(JsonFileStore::new(dir.path())).unwrap();
    assert_eq!(store.settings().restaurant_name, "Warung Bu Sri");
    assert_eq!(store.tables().len(), 5);
    assert_eq!(store.tables()[1].status, TableStatus::Occupied);
    assert_eq!(store.order(&order_id).unwrap().status, OrderStatus::Completed);
    assert_eq!(store.stock("3").unwrap().current_stock, 26);
}

#[test]
fn test_one_file_per_collection() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = AppStore::open(JsonFileStore::new(dir.path())).unwrap();
    store.add_staff("Rina").unwrap();
    store
        .add_order(OrderCreate {
            items: vec![OrderItem::new("1", "Nasi Putih", 1, "porsi")],
            ..Default::default()
        })
        .unwrap();

    assert!(dir.path().join("staffs.json").exists());
    assert!(dir.path().join("orders.json").exists());
    assert!(dir.path().join("stocks.json").exists());
    assert!(!dir.path().join("settings.json").exists());
}

#[test]
fn test_corrupt_collection_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("orders.json"), "{not json").unwrap();

    assert!(matches!(
        AppStore::open(JsonFileStore::new(dir.path())),
        Err(StoreError::Serde(_))
    ));
}

#[test]
fn test_legacy_settings_fields() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{"restaurant_name": "Kedai Lama", "auto_backup": false, "paper_size": "58mm"}"#,
    )
    .unwrap();

    let store = AppStore::open(JsonFileStore::new(dir.path())).unwrap();
    let settings = store.settings();
    assert_eq!(settings.restaurant_name, "Kedai Lama");
    assert!(!settings.auto_print);
    assert_eq!(settings.receipt_settings().width(), 32);
    assert_eq!(settings.print_copies, 1);
}
