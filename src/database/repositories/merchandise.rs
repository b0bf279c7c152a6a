//! Merchandise catalog and cart repository implementation

use sqlx::{PgPool, Postgres, Transaction};
use chrono::Utc;
use rust_decimal::Decimal;
use crate::models::merchandise::{
    AddCartOrderRequest, CartOrder, CreateMerchandiseItemRequest, MerchandiseItem,
};
use crate::utils::errors::EngineError;

const ITEM_COLUMNS: &str = "id, event_id, name, price, stock_quantity, sizes, is_active, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, registration_id, item_id, selected_size, quantity, line_total, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct MerchandiseRepository {
    pool: PgPool,
}

impl MerchandiseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a catalog item
    pub async fn create_item(
        &self,
        request: CreateMerchandiseItemRequest,
    ) -> Result<MerchandiseItem, EngineError> {
        let sizes = serde_json::to_value(&request.sizes)?;
        let item = sqlx::query_as::<_, MerchandiseItem>(&format!(
            r#"
            INSERT INTO merchandise_items (event_id, name, price, stock_quantity, sizes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(request.event_id)
        .bind(request.name)
        .bind(request.price)
        .bind(request.stock_quantity)
        .bind(sizes)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Find catalog item by ID
    pub async fn find_item(&self, id: i64) -> Result<Option<MerchandiseItem>, EngineError> {
        let item = sqlx::query_as::<_, MerchandiseItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM merchandise_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Find several catalog items at once
    pub async fn find_items(&self, ids: &[i64]) -> Result<Vec<MerchandiseItem>, EngineError> {
        let items = sqlx::query_as::<_, MerchandiseItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM merchandise_items WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Active catalog items for an event
    pub async fn items_for_event(&self, event_id: i64) -> Result<Vec<MerchandiseItem>, EngineError> {
        let items = sqlx::query_as::<_, MerchandiseItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM merchandise_items WHERE event_id = $1 AND is_active = TRUE ORDER BY name ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Add a cart line for a registration
    pub async fn add_cart_order(
        &self,
        request: &AddCartOrderRequest,
        line_total: Decimal,
    ) -> Result<CartOrder, EngineError> {
        let order = sqlx::query_as::<_, CartOrder>(&format!(
            r#"
            INSERT INTO cart_orders (registration_id, item_id, selected_size, quantity, line_total, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(request.registration_id)
        .bind(request.item_id)
        .bind(&request.selected_size)
        .bind(request.quantity)
        .bind(line_total)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    /// Cart lines for a registration
    pub async fn cart_orders(&self, registration_id: i64) -> Result<Vec<CartOrder>, EngineError> {
        let orders = sqlx::query_as::<_, CartOrder>(&format!(
            "SELECT {ORDER_COLUMNS} FROM cart_orders WHERE registration_id = $1 ORDER BY created_at ASC"
        ))
        .bind(registration_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Remove a cart line
    pub async fn remove_cart_order(
        &self,
        registration_id: i64,
        order_id: i64,
    ) -> Result<(), EngineError> {
        sqlx::query("DELETE FROM cart_orders WHERE id = $1 AND registration_id = $2")
            .bind(order_id)
            .bind(registration_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete every cart line for a registration after checkout
    pub async fn clear_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        registration_id: i64,
    ) -> Result<(), EngineError> {
        sqlx::query("DELETE FROM cart_orders WHERE registration_id = $1")
            .bind(registration_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Atomically consume stock for a checkout line.
    ///
    /// Unlimited stock (NULL quantity) always passes; finite stock only
    /// decrements when enough remains. Returns false when the guard fails,
    /// which the caller must treat as an insufficient-stock conflict.
    pub async fn consume_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item_id: i64,
        quantity: i32,
    ) -> Result<bool, EngineError> {
        let result = sqlx::query(
            r#"
            UPDATE merchandise_items
            SET stock_quantity = stock_quantity - $2, updated_at = $3
            WHERE id = $1
              AND is_active = TRUE
              AND (stock_quantity IS NULL OR stock_quantity >= $2)
            "#,
        )
        .bind(item_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
