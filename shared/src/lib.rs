//! Shared types for Kasir
//!
//! Domain models used by the printer dispatch layer and the application
//! layer: orders, stock, tables and settings.

pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
pub use types::Timestamp;
