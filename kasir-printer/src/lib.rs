//! # kasir-printer
//!
//! Bluetooth thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building
//! - Fixed-width chunking for narrow paper
//! - BLE discovery / pairing through a pluggable transport
//! - Multi-printer dispatch with one reconnect-and-retry per print
//!
//! Business logic (WHAT to print) stays in application code:
//! - Receipt rendering → kasir-app
//!
//! ## Example
//!
//! ```ignore
//! use kasir_printer::{EscPosTextBuilder, PrinterManager};
//!
//! let mut b = EscPosTextBuilder::new(32);
//! b.init().align_center();
//! b.write_wrapped("Restoran Contoh Makanan Lezat Sekali");
//! b.feed(4).cut_feed(0);
//!
//! let mut printers = PrinterManager::new(transport);
//! if printers.connect().await {
//!     printers.print(b.finalize().as_bytes(), None).await;
//! }
//! ```

mod bluetooth;
mod dispatch;
mod error;
mod escpos;
mod wrap;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-exports
pub use bluetooth::{
    BleTransport, DeviceFilter, DiscoveredDevice, ISSC_SERVICE, ISSC_WRITE_CHARACTERISTIC,
    PRINTER_NAME_PREFIXES, PRINTER_SERVICE, PRINTER_WRITE_CHARACTERISTIC, RequestDeviceOptions,
    SERVICE_PAIRS, ServicePair,
};
pub use dispatch::{
    ConnectOutcome, DispatchConfig, DispatchReport, Endpoint, PrintAttempt, PrinterManager,
};
pub use error::{PrintError, PrintResult};
pub use escpos::{EscPosTextBuilder, SHORT_RULE_MAX};
pub use wrap::chunk;
