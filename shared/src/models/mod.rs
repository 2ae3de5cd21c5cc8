//! Data models
//!
//! Records are persisted as JSON by the application store.
//! All record IDs are `String` (UUID v4), timestamps are Unix millis.

pub mod order;
pub mod settings;
pub mod stock;
pub mod table;

// Re-exports
pub use order::*;
pub use settings::*;
pub use stock::*;
pub use table::*;
