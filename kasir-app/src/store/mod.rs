//! Application state store
//!
//! Owns orders, stock, tables, staff and settings. Every mutation saves
//! the collections it touched through the injected persistence port.

mod persistence;
mod state;

pub use persistence::{
    JsonFileStore, MemoryStore, ORDERS_KEY, SETTINGS_KEY, STAFFS_KEY, STOCKS_KEY, StatePersistence,
    TABLES_KEY,
};
pub use state::{AppStore, default_staffs, default_stocks};
