//! Stock Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Stock item entity (one sellable product with an on-hand quantity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: String,
    pub name: String,
    pub category: String,
    /// May go negative when orders outrun recorded stock
    pub current_stock: i64,
    pub min_stock: i64,
    pub unit: String,
    pub last_updated: Timestamp,
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub is_package: bool,
    #[serde(default)]
    pub without_rice: bool,
}

impl StockItem {
    /// At or below the configured minimum
    pub fn is_low(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

/// Create stock payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCreate {
    pub name: String,
    pub category: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub unit: String,
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub is_package: bool,
    #[serde(default)]
    pub without_rice: bool,
}

/// Update stock payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub current_stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub unit: Option<String>,
    pub cost: Option<Decimal>,
    pub is_package: Option<bool>,
    pub without_rice: Option<bool>,
}
