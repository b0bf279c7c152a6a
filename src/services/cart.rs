//! Merchandise cart service
//!
//! Validates item/size/stock selections, builds cart summaries against
//! current inventory, and gates checkout on stock and the modification
//! window. Stock consumption at checkout happens inside one transaction
//! with the registration total update and the cart clear.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::merchandise::{
    AddCartOrderRequest, CartLine, CartOrder, CartSummary, MerchandiseItem, StockStatus,
};
use crate::models::registration::{MoneyBreakdown, Registration, RegistrationStatus};
use crate::services::modification::can_modify;
use crate::utils::errors::{EngineError, Result};

/// Classify a requested quantity against an item's current stock
pub fn stock_status_for(item: &MerchandiseItem, requested_qty: i32) -> StockStatus {
    match item.stock_quantity {
        None => StockStatus::Unlimited,
        Some(stock) if stock >= requested_qty => StockStatus::Available,
        Some(_) => StockStatus::Insufficient,
    }
}

/// Validate an item/size/quantity selection against the catalog.
///
/// Returns the stock classification on success and a display reason on
/// failure. Unlimited stock always passes the quantity check.
pub fn validate_stock(
    item: &MerchandiseItem,
    requested_qty: i32,
    selected_size: Option<&str>,
) -> std::result::Result<StockStatus, String> {
    if requested_qty <= 0 {
        return Err("Quantity must be at least 1".to_string());
    }

    if !item.is_active {
        return Err(format!("'{}' is no longer available", item.name));
    }

    if item.has_sizes() {
        match selected_size {
            None => return Err(format!("Select a size for '{}'", item.name)),
            Some(size) if !item.size_list().iter().any(|s| s == size) => {
                return Err(format!("'{}' is not an available size for '{}'", size, item.name));
            }
            Some(_) => {}
        }
    }

    match stock_status_for(item, requested_qty) {
        StockStatus::Insufficient => Err(format!(
            "Only {} of '{}' left in stock",
            item.stock_quantity.unwrap_or(0),
            item.name
        )),
        status => Ok(status),
    }
}

/// Everything that currently blocks a checkout, collected rather than
/// short-circuited
#[derive(Debug, Clone)]
pub struct CheckoutValidation {
    pub summary: CartSummary,
    pub blocking_reasons: Vec<String>,
}

impl CheckoutValidation {
    pub fn is_ok(&self) -> bool {
        self.blocking_reasons.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CartService {
    db: DatabaseService,
}

impl CartService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Add a line to a registration's cart after validating the selection
    pub async fn add_to_cart(&self, request: AddCartOrderRequest) -> Result<CartOrder> {
        let registration = self
            .db
            .registrations
            .get_checked(request.registration_id)
            .await?;
        let event = self.db.events.get(registration.event_id).await?;

        if !event.has_merchandise {
            return Err(EngineError::StateConflict(
                "This event does not offer merchandise".to_string(),
            ));
        }

        let item = self
            .db
            .merchandise
            .find_item(request.item_id)
            .await?
            .ok_or(EngineError::MerchandiseItemNotFound {
                item_id: request.item_id,
            })?;

        if item.event_id != event.id {
            return Err(EngineError::InvalidInput(
                "The selected item belongs to a different event".to_string(),
            ));
        }

        validate_stock(&item, request.quantity, request.selected_size.as_deref())
            .map_err(EngineError::InvalidInput)?;

        let line_total = item.price * Decimal::from(request.quantity);
        let order = self.db.merchandise.add_cart_order(&request, line_total).await?;

        debug!(
            registration_id = registration.id,
            item_id = item.id,
            quantity = request.quantity,
            "Cart line added"
        );

        Ok(order)
    }

    /// Active catalog items a registrant can order for an event
    pub async fn available_items(&self, event_id: i64) -> Result<Vec<MerchandiseItem>> {
        self.db.merchandise.items_for_event(event_id).await
    }

    /// Remove a line from a registration's cart
    pub async fn remove_from_cart(&self, registration_id: i64, order_id: i64) -> Result<()> {
        self.db
            .merchandise
            .remove_cart_order(registration_id, order_id)
            .await
    }

    /// Aggregate the cart into totals, flagging lines whose backing item
    /// has since gone inactive or under-stocked
    pub async fn cart_summary(&self, registration_id: i64) -> Result<CartSummary> {
        let orders = self.db.merchandise.cart_orders(registration_id).await?;

        let item_ids: Vec<i64> = orders.iter().map(|o| o.item_id).collect();
        let items = self.db.merchandise.find_items(&item_ids).await?;

        let mut lines = Vec::with_capacity(orders.len());
        let mut total_quantity = 0;
        let mut total_amount = Decimal::ZERO;

        for order in orders {
            let item = items.iter().find(|i| i.id == order.item_id).ok_or_else(|| {
                EngineError::ConsistencyViolation(format!(
                    "cart order {} references missing item {}",
                    order.id, order.item_id
                ))
            })?;

            total_quantity += order.quantity;
            total_amount += order.line_total;
            lines.push(CartLine {
                stock_status: stock_status_for(item, order.quantity),
                item_name: item.name.clone(),
                item_is_active: item.is_active,
                order,
            });
        }

        Ok(CartSummary {
            registration_id,
            lines,
            total_quantity,
            total_amount,
        })
    }

    /// Collect every reason the cart cannot check out right now
    pub async fn validate_checkout(&self, registration_id: i64) -> Result<CheckoutValidation> {
        let registration = self.db.registrations.get_checked(registration_id).await?;
        let event = self.db.events.get(registration.event_id).await?;
        let summary = self.cart_summary(registration_id).await?;

        let mut reasons = Vec::new();

        if !event.has_merchandise {
            reasons.push("This event does not offer merchandise".to_string());
        }

        if registration.status != RegistrationStatus::Confirmed {
            reasons.push("Only confirmed registrations can check out".to_string());
        }

        let window = can_modify(&registration, &event, Utc::now());
        if !window.open {
            if let Some(reason) = &window.reason {
                reasons.push(reason.clone());
            }
        }

        if summary.is_empty() {
            reasons.push("The cart is empty".to_string());
        }

        for line in summary.problem_lines() {
            if !line.item_is_active {
                reasons.push(format!("'{}' is no longer available", line.item_name));
            } else {
                reasons.push(format!("Not enough stock for '{}'", line.item_name));
            }
        }

        Ok(CheckoutValidation {
            summary,
            blocking_reasons: reasons,
        })
    }

    /// Finalize the cart: consume stock, fold the cart total into the
    /// registration's merchandise component, and clear the cart, all in
    /// one transaction.
    pub async fn checkout(&self, registration_id: i64) -> Result<Registration> {
        let validation = self.validate_checkout(registration_id).await?;
        if !validation.is_ok() {
            return Err(EngineError::StateConflict(
                validation.blocking_reasons.join("; "),
            ));
        }

        let registration = self.db.registrations.get_checked(registration_id).await?;
        let summary = validation.summary;

        let mut tx = self.db.pool().begin().await.map_err(EngineError::Database)?;

        for line in &summary.lines {
            let consumed = self
                .db
                .merchandise
                .consume_stock(&mut tx, line.order.item_id, line.order.quantity)
                .await?;
            if !consumed {
                tx.rollback().await.map_err(EngineError::Database)?;
                return Err(EngineError::StateConflict(format!(
                    "Not enough stock for '{}'",
                    line.item_name
                )));
            }
        }

        let money = MoneyBreakdown::from_components(
            registration.registration_fee_paid,
            registration.guest_fees_paid,
            registration.merchandise_total + summary.total_amount,
            registration.donation_amount,
        );
        self.db
            .registrations
            .set_merchandise_total(&mut tx, registration_id, &money)
            .await?;

        self.db.merchandise.clear_cart(&mut tx, registration_id).await?;

        tx.commit().await.map_err(EngineError::Database)?;

        info!(
            registration_id = registration_id,
            amount = %summary.total_amount,
            lines = summary.lines.len(),
            "Cart checkout completed"
        );

        self.db.registrations.get_checked(registration_id).await
    }
}
