//! Order Model

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// One line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub stock_id: String,
    /// Product name as printed on the receipt
    pub stock_name: String,
    pub quantity: u32,
    /// Unit label ("porsi", "potong", ...)
    pub unit: String,
    pub notes: Option<String>,
    pub order_type: Option<String>,
}

impl OrderItem {
    pub fn new(
        stock_id: impl Into<String>,
        stock_name: impl Into<String>,
        quantity: u32,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: crate::util::new_id(),
            stock_id: stock_id.into(),
            stock_name: stock_name.into(),
            quantity,
            unit: unit.into(),
            notes: None,
            order_type: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Order entity
///
/// Snapshot passed to the receipt renderer at print time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Human-readable number, `ORD-<millis>`
    pub order_number: String,
    pub items: Vec<OrderItem>,
    /// Sum of item quantities
    pub total_items: u32,
    pub created_at: Timestamp,
    #[serde(default)]
    pub status: OrderStatus,
    pub customer: Option<String>,
    pub table_number: Option<String>,
    pub staff_name: Option<String>,
    pub notes: Option<String>,
    pub order_type: Option<String>,
}

impl Order {
    /// Sum of quantities over a set of items
    pub fn count_items(items: &[OrderItem]) -> u32 {
        items.iter().map(|i| i.quantity).sum()
    }
}

/// Create order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderCreate {
    pub items: Vec<OrderItem>,
    pub customer: Option<String>,
    pub table_number: Option<String>,
    pub staff_name: Option<String>,
    pub notes: Option<String>,
    pub order_type: Option<String>,
}
