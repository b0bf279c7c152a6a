//! Merchandise catalog and cart models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Per-event catalog entry. `stock_quantity = None` means unlimited stock.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MerchandiseItem {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: Option<i32>,
    pub sizes: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MerchandiseItem {
    /// Size list decoded from the stored JSON array; empty means the item
    /// has no size selection.
    pub fn size_list(&self) -> Vec<String> {
        serde_json::from_value(self.sizes.clone()).unwrap_or_default()
    }

    pub fn has_sizes(&self) -> bool {
        !self.size_list().is_empty()
    }
}

/// Cart line item; exists only until the registration finalizes checkout
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartOrder {
    pub id: i64,
    pub registration_id: i64,
    pub item_id: i64,
    pub selected_size: Option<String>,
    pub quantity: i32,
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Classification of a cart line against current inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    Available,
    Insufficient,
    Unlimited,
}

/// A cart line joined with its backing catalog item state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub order: CartOrder,
    pub item_name: String,
    pub item_is_active: bool,
    pub stock_status: StockStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSummary {
    pub registration_id: i64,
    pub lines: Vec<CartLine>,
    pub total_quantity: i32,
    pub total_amount: Decimal,
}

impl CartSummary {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines that cannot currently be fulfilled
    pub fn problem_lines(&self) -> Vec<&CartLine> {
        self.lines
            .iter()
            .filter(|l| !l.item_is_active || l.stock_status == StockStatus::Insufficient)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMerchandiseItemRequest {
    pub event_id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: Option<i32>,
    pub sizes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartOrderRequest {
    pub registration_id: i64,
    pub item_id: i64,
    pub selected_size: Option<String>,
    pub quantity: i32,
}
