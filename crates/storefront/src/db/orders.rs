//! Order and order-item repository.
//!
//! Orders are written by the placement pipeline (header first, then items)
//! and read back for the history and confirmation views. There is no
//! update path here; status transitions belong to back-office tooling.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use hk_leather_core::{OrderId, OrderStatus, PaymentMethod, UserId};

use super::RepositoryError;
use crate::models::order::{NewOrder, NewOrderItem, Order, OrderItem, OrderSummary};
use crate::services::checkout::OrderStore;

/// Repository for order records.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    total_amount: Decimal,
    shipping_address: String,
    shipping_city: String,
    shipping_postal_code: Option<String>,
    payment_method: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    product_name: String,
    product_image: String,
    quantity: i32,
    unit_price: Decimal,
}

#[derive(sqlx::FromRow)]
struct OrderSummaryRow {
    id: Uuid,
    status: String,
    total_amount: Decimal,
    payment_method: String,
    item_count: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::DataCorruption(format!("order status: {e}")))?;
        let payment_method = row
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|e| RepositoryError::DataCorruption(format!("payment method: {e}")))?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            status,
            total_amount: row.total_amount,
            shipping_address: row.shipping_address,
            shipping_city: row.shipping_city,
            shipping_postal_code: row.shipping_postal_code,
            payment_method,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

impl OrderRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order header, returning the generated ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let row: (Uuid,) = sqlx::query_as(
            r"
            INSERT INTO orders
                (user_id, status, total_amount, shipping_address, shipping_city,
                 shipping_postal_code, payment_method, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(order.user_id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.total_amount)
        .bind(&order.shipping_address)
        .bind(&order.shipping_city)
        .bind(order.shipping_postal_code.as_deref())
        .bind(order.payment_method.as_str())
        .bind(order.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderId::new(row.0))
    }

    /// Insert the snapshotted line items for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; items are
    /// written inside one transaction so a failure leaves no partial set.
    pub async fn insert_order_items(
        &self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for item in items {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_name, product_image, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order_id.as_uuid())
            .bind(&item.product_name)
            .bind(&item.product_image)
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// List the user's orders, newest first, each with its item count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails,
    /// `RepositoryError::DataCorruption` if a stored enum is unreadable.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(
            r"
            SELECT o.id, o.status, o.total_amount, o.payment_method, o.created_at,
                   COUNT(i.id) AS item_count
            FROM orders o
            LEFT JOIN order_items i ON i.order_id = o.id
            WHERE o.user_id = $1
            GROUP BY o.id
            ORDER BY o.created_at DESC
            ",
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let status = row
                    .status
                    .parse::<OrderStatus>()
                    .map_err(|e| RepositoryError::DataCorruption(format!("order status: {e}")))?;
                let payment_method = row.payment_method.parse::<PaymentMethod>().map_err(|e| {
                    RepositoryError::DataCorruption(format!("payment method: {e}"))
                })?;
                Ok(OrderSummary {
                    id: OrderId::new(row.id),
                    status,
                    total_amount: row.total_amount,
                    payment_method,
                    item_count: row.item_count,
                    created_at: row.created_at,
                })
            })
            .collect()
    }

    /// Fetch one order with its items, scoped to the owning user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such order exists for this
    /// user, `RepositoryError::Database` on query failure.
    pub async fn get_for_user(
        &self,
        order_id: OrderId,
        user: UserId,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, status, total_amount, shipping_address, shipping_city,
                   shipping_postal_code, payment_method, notes, created_at
            FROM orders
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(order_id.as_uuid())
        .bind(user.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let order = Order::try_from(row)?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT product_name, product_image, quantity, unit_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| OrderItem {
            product_name: row.product_name,
            product_image: row.product_image,
            quantity: u32::try_from(row.quantity.max(0)).unwrap_or(0),
            unit_price: row.unit_price,
        })
        .collect();

        Ok((order, items))
    }
}

impl OrderStore for OrderRepository {
    async fn insert_header(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        self.insert_order(order).await
    }

    async fn insert_items(
        &self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<(), RepositoryError> {
        self.insert_order_items(order_id, items).await
    }
}
