use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{
    AppSettings, Order, OrderCreate, OrderStatus, SettingsUpdate, StockCreate, StockItem,
    StockUpdate, Table, TableStatus,
};
use shared::util::{new_id, now_millis};
use tracing::instrument;

use super::persistence::{
    ORDERS_KEY, SETTINGS_KEY, STAFFS_KEY, STOCKS_KEY, StatePersistence, TABLES_KEY,
};
use crate::error::{StoreError, StoreResult};
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text, validate_settings,
};

/// Sample catalog for a fresh install
pub fn default_stocks() -> Vec<StockItem> {
    let now = now_millis();
    let item = |id: &str, name: &str, category: &str, stock, min, unit: &str, cost: i64| StockItem {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        current_stock: stock,
        min_stock: min,
        unit: unit.to_string(),
        last_updated: now,
        cost: Some(cost.into()),
        is_package: false,
        without_rice: false,
    };
    vec![
        item("1", "Nasi Putih", "Makanan Pokok", 50, 10, "porsi", 5000),
        item("2", "Ayam Goreng", "Protein", 25, 5, "potong", 15000),
        item("3", "Sayur Sop", "Sayuran", 30, 8, "porsi", 8000),
    ]
}

pub fn default_staffs() -> Vec<String> {
    vec!["Staff 1".into(), "Staff 2".into(), "Manager".into()]
}

fn numbered_tables(count: usize) -> Vec<Table> {
    (1..=count).map(Table::numbered).collect()
}

/// Treat blank strings as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct AppStore<P: StatePersistence> {
    persistence: P,
    stocks: Vec<StockItem>,
    /// Newest first
    orders: Vec<Order>,
    settings: AppSettings,
    staffs: Vec<String>,
    tables: Vec<Table>,
}

impl<P: StatePersistence> AppStore<P> {
    /// Load every collection, falling back to defaults for missing ones
    ///
    /// Stored settings are validated; a broken settings document fails the load.
    pub fn open(persistence: P) -> StoreResult<Self> {
        let stocks = load_or(&persistence, STOCKS_KEY, default_stocks)?;
        let orders = load_or(&persistence, ORDERS_KEY, Vec::new)?;
        let settings: AppSettings = load_or(&persistence, SETTINGS_KEY, AppSettings::default)?;
        validate_settings(&settings)?;
        let staffs = load_or(&persistence, STAFFS_KEY, default_staffs)?;
        let tables = load_or(&persistence, TABLES_KEY, || {
            numbered_tables(settings.number_of_tables)
        })?;

        tracing::info!(
            stocks = stocks.len(),
            orders = orders.len(),
            tables = tables.len(),
            "Store loaded"
        );

        Ok(Self {
            persistence,
            stocks,
            orders,
            settings,
            staffs,
            tables,
        })
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn stocks(&self) -> &[StockItem] {
        &self.stocks
    }

    pub fn stock(&self, id: &str) -> Option<&StockItem> {
        self.stocks.iter().find(|s| s.id == id)
    }

    /// Items at or below their minimum stock
    pub fn low_stock(&self) -> Vec<&StockItem> {
        self.stocks.iter().filter(|s| s.is_low()).collect()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn staffs(&self) -> &[String] {
        &self.staffs
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    // ========== Stock ==========
    //
    // Mutations save the next collection before swapping it in; a failed
    // save leaves memory untouched.

    #[instrument(skip(self, data), fields(name = %data.name))]
    pub fn add_stock(&mut self, data: StockCreate) -> StoreResult<StockItem> {
        validate_stock(&data)?;
        let stock = new_stock(data, now_millis());
        let mut stocks = self.stocks.clone();
        stocks.push(stock.clone());
        self.save(STOCKS_KEY, &stocks)?;
        self.stocks = stocks;
        Ok(stock)
    }

    /// Append many items; nothing is added if any item is invalid
    #[instrument(skip(self, data), fields(count = data.len()))]
    pub fn bulk_import_stocks(&mut self, data: Vec<StockCreate>) -> StoreResult<Vec<StockItem>> {
        for item in &data {
            validate_stock(item)?;
        }
        let now = now_millis();
        let created: Vec<StockItem> = data.into_iter().map(|d| new_stock(d, now)).collect();
        let mut stocks = self.stocks.clone();
        stocks.extend(created.iter().cloned());
        self.save(STOCKS_KEY, &stocks)?;
        self.stocks = stocks;
        tracing::info!(count = created.len(), "Stock imported");
        Ok(created)
    }

    #[instrument(skip(self, update))]
    pub fn update_stock(&mut self, id: &str, update: StockUpdate) -> StoreResult<StockItem> {
        if let Some(name) = &update.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&update.category, "category", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&update.unit, "unit", MAX_SHORT_TEXT_LEN)?;

        let mut stocks = self.stocks.clone();
        let stock = find_stock(&mut stocks, id)?;

        let StockUpdate {
            name,
            category,
            current_stock,
            min_stock,
            unit,
            cost,
            is_package,
            without_rice,
        } = update;
        if let Some(v) = name {
            stock.name = v;
        }
        if let Some(v) = category {
            stock.category = v;
        }
        if let Some(v) = current_stock {
            stock.current_stock = v;
        }
        if let Some(v) = min_stock {
            stock.min_stock = v;
        }
        if let Some(v) = unit {
            stock.unit = v;
        }
        if let Some(v) = cost {
            stock.cost = Some(v);
        }
        if let Some(v) = is_package {
            stock.is_package = v;
        }
        if let Some(v) = without_rice {
            stock.without_rice = v;
        }
        stock.last_updated = now_millis();

        let updated = stock.clone();
        self.save(STOCKS_KEY, &stocks)?;
        self.stocks = stocks;
        Ok(updated)
    }

    /// Returns whether an item was removed
    #[instrument(skip(self))]
    pub fn delete_stock(&mut self, id: &str) -> StoreResult<bool> {
        let mut stocks = self.stocks.clone();
        stocks.retain(|s| s.id != id);
        if stocks.len() == self.stocks.len() {
            return Ok(false);
        }
        self.save(STOCKS_KEY, &stocks)?;
        self.stocks = stocks;
        Ok(true)
    }

    /// Set the on-hand quantity (stock take)
    #[instrument(skip(self))]
    pub fn update_stock_quantity(&mut self, id: &str, quantity: i64) -> StoreResult<()> {
        let mut stocks = self.stocks.clone();
        let stock = find_stock(&mut stocks, id)?;
        stock.current_stock = quantity;
        stock.last_updated = now_millis();
        self.save(STOCKS_KEY, &stocks)?;
        self.stocks = stocks;
        Ok(())
    }

    // ========== Orders ==========

    /// Record a new order
    ///
    /// Decrements stock for every item and occupies the table whose label
    /// matches `table_number`.
    #[instrument(skip(self, data), fields(items = data.items.len()))]
    pub fn add_order(&mut self, data: OrderCreate) -> StoreResult<Order> {
        if data.items.is_empty() {
            return Err(StoreError::validation("order must contain at least one item"));
        }
        if data.items.iter().any(|i| i.quantity == 0) {
            return Err(StoreError::validation("item quantity must be at least 1"));
        }
        validate_optional_text(&data.customer, "customer", MAX_NAME_LEN)?;
        validate_optional_text(&data.staff_name, "staff_name", MAX_NAME_LEN)?;
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
        for item in &data.items {
            validate_optional_text(&item.notes, "item notes", MAX_NOTE_LEN)?;
        }

        let now = now_millis();
        let staff_name = non_blank(data.staff_name)
            .or_else(|| non_blank(Some(self.settings.default_staff_name.clone())));
        let order = Order {
            id: new_id(),
            order_number: format!("ORD-{now}"),
            total_items: Order::count_items(&data.items),
            items: data.items,
            created_at: now,
            status: OrderStatus::Pending,
            customer: non_blank(data.customer),
            table_number: non_blank(data.table_number),
            staff_name,
            notes: non_blank(data.notes),
            order_type: non_blank(data.order_type),
        };

        let mut orders = self.orders.clone();
        orders.insert(0, order.clone());

        let mut stocks = self.stocks.clone();
        let mut stock_changed = false;
        for item in &order.items {
            if let Some(stock) = stocks.iter_mut().find(|s| s.id == item.stock_id) {
                stock.current_stock -= i64::from(item.quantity);
                stock.last_updated = now;
                stock_changed = true;
            }
        }

        let mut tables = self.tables.clone();
        let table = order
            .table_number
            .as_deref()
            .and_then(|number| tables.iter_mut().find(|t| t.number == number));
        let table_changed = match table {
            Some(table) => {
                table.current_order = Some(order.id.clone());
                table.status = TableStatus::Occupied;
                true
            }
            None => false,
        };

        self.save(ORDERS_KEY, &orders)?;
        if stock_changed {
            self.save(STOCKS_KEY, &stocks)?;
        }
        if table_changed {
            self.save(TABLES_KEY, &tables)?;
        }
        self.orders = orders;
        self.stocks = stocks;
        self.tables = tables;

        tracing::info!(
            order_number = %order.order_number,
            total_items = order.total_items,
            "Order created"
        );
        Ok(order)
    }

    #[instrument(skip(self))]
    pub fn update_order_status(&mut self, id: &str, status: OrderStatus) -> StoreResult<()> {
        let mut orders = self.orders.clone();
        orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::not_found(format!("order {id}")))?
            .status = status;
        self.save(ORDERS_KEY, &orders)?;
        self.orders = orders;
        Ok(())
    }

    // ========== Tables ==========

    #[instrument(skip(self))]
    pub fn update_table_status(&mut self, table_id: &str, status: TableStatus) -> StoreResult<()> {
        let mut tables = self.tables.clone();
        find_table(&mut tables, table_id)?.status = status;
        self.save(TABLES_KEY, &tables)?;
        self.tables = tables;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn assign_order_to_table(&mut self, table_id: &str, order_id: &str) -> StoreResult<()> {
        let mut tables = self.tables.clone();
        let table = find_table(&mut tables, table_id)?;
        table.current_order = Some(order_id.to_string());
        table.status = TableStatus::Occupied;
        self.save(TABLES_KEY, &tables)?;
        self.tables = tables;
        Ok(())
    }

    // ========== Settings ==========

    /// Merge and validate a settings update; nothing changes on error
    #[instrument(skip(self, update))]
    pub fn update_settings(&mut self, update: SettingsUpdate) -> StoreResult<&AppSettings> {
        let mut settings = self.settings.clone();
        settings.apply(update);
        validate_settings(&settings)?;

        let mut tables = self.tables.clone();
        let tables_changed = resize_tables(&mut tables, settings.number_of_tables);

        self.save(SETTINGS_KEY, &settings)?;
        if tables_changed {
            self.save(TABLES_KEY, &tables)?;
        }
        self.settings = settings;
        self.tables = tables;
        Ok(&self.settings)
    }

    // ========== Staff ==========

    /// Add a staff name; blank or duplicate names are ignored
    #[instrument(skip(self))]
    pub fn add_staff(&mut self, name: &str) -> StoreResult<bool> {
        let name = name.trim();
        if name.is_empty() || self.staffs.iter().any(|s| s == name) {
            return Ok(false);
        }
        validate_required_text(name, "staff name", MAX_NAME_LEN)?;
        let mut staffs = self.staffs.clone();
        staffs.push(name.to_string());
        self.save(STAFFS_KEY, &staffs)?;
        self.staffs = staffs;
        Ok(true)
    }

    #[instrument(skip(self))]
    pub fn remove_staff(&mut self, name: &str) -> StoreResult<bool> {
        let mut staffs = self.staffs.clone();
        staffs.retain(|s| s != name);
        if staffs.len() == self.staffs.len() {
            return Ok(false);
        }
        self.save(STAFFS_KEY, &staffs)?;
        self.staffs = staffs;
        Ok(true)
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.persistence.save(key, &json)
    }
}

fn load_or<P, T>(persistence: &P, key: &str, default: impl FnOnce() -> T) -> StoreResult<T>
where
    P: StatePersistence,
    T: DeserializeOwned,
{
    match persistence.load(key)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(default()),
    }
}

fn find_stock<'a>(stocks: &'a mut [StockItem], id: &str) -> StoreResult<&'a mut StockItem> {
    stocks
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| StoreError::not_found(format!("stock {id}")))
}

fn find_table<'a>(tables: &'a mut [Table], table_id: &str) -> StoreResult<&'a mut Table> {
    tables
        .iter_mut()
        .find(|t| t.id == table_id)
        .ok_or_else(|| StoreError::not_found(format!("table {table_id}")))
}

/// Grow or shrink the table list to `count`; returns whether it changed
fn resize_tables(tables: &mut Vec<Table>, count: usize) -> bool {
    let current = tables.len();
    if count > current {
        tables.extend((current + 1..=count).map(Table::numbered));
        true
    } else if count < current {
        for table in &tables[count..] {
            if table.status == TableStatus::Occupied {
                tracing::warn!(table = %table.number, "Dropping occupied table");
            }
        }
        tables.truncate(count);
        true
    } else {
        false
    }
}

fn validate_stock(data: &StockCreate) -> StoreResult<()> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&data.unit, "unit", MAX_SHORT_TEXT_LEN)?;
    if data.category.chars().count() > MAX_SHORT_TEXT_LEN {
        return Err(StoreError::validation(format!(
            "category is too long (max {MAX_SHORT_TEXT_LEN})"
        )));
    }
    Ok(())
}

fn new_stock(data: StockCreate, now: i64) -> StockItem {
    StockItem {
        id: new_id(),
        name: data.name,
        category: data.category,
        current_stock: data.current_stock,
        min_stock: data.min_stock,
        unit: data.unit,
        last_updated: now,
        cost: data.cost,
        is_package: data.is_package,
        without_rice: data.without_rice,
    }
}
