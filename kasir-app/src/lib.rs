//! # kasir-app
//!
//! Application layer of the Kasir POS:
//! - `printing`: receipt rendering and dispatch to bluetooth printers
//! - `store`: orders, stock, tables, staff and settings with pluggable persistence
//! - `app`: ties the store to the print service (auto-print on new orders)

pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod printing;
pub mod store;
pub mod validation;

// Re-exports
pub use app::App;
pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use printing::{PrintService, PrinterInfo, ReceiptRenderer};
pub use store::{AppStore, JsonFileStore, MemoryStore, StatePersistence};

/// Load `.env`, read configuration and initialize logging
pub fn setup_environment() -> Config {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    logger::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    tracing::info!(
        data_dir = %config.data_dir.display(),
        environment = %config.environment,
        dispatch = ?config.dispatch,
        "Kasir environment ready"
    );
    config
}
