//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table occupancy status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
}

/// Dining table entity (meja)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    /// Display label, also what orders reference (`Meja 3`)
    pub number: String,
    #[serde(default)]
    pub status: TableStatus,
    pub capacity: u32,
    pub current_order: Option<String>,
}

impl Table {
    /// Default seating capacity for generated tables
    pub const DEFAULT_CAPACITY: u32 = 4;

    /// Generated table for 1-based position `n`
    pub fn numbered(n: usize) -> Self {
        Self {
            id: n.to_string(),
            number: format!("Meja {}", n),
            status: TableStatus::Available,
            capacity: Self::DEFAULT_CAPACITY,
            current_order: None,
        }
    }
}
