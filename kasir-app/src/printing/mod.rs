//! Receipt printing
//!
//! - `receipt`: renders an order into ESC/POS text
//! - `service`: renders and dispatches receipts to connected printers

pub mod receipt;
pub mod service;

pub use receipt::{ReceiptRenderer, format_timestamp};
pub use service::{PrintService, PrinterInfo};
