//! Remote cart store: one `cart_items` row per line item per user.
//!
//! Writes use the full-replace discipline: delete every row for the user,
//! then insert the complete current line set. Replace is idempotent and the
//! last completed write wins, which is what makes unordered completion of
//! in-flight writes safe.

use sqlx::PgPool;
use tracing::warn;

use hk_leather_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{CartLine, DEFAULT_VARIANT, LineSnapshot};
use crate::services::cart::RemoteCartStore;

/// Repository for the per-user durable cart.
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: i32,
    quantity: i32,
    snapshot: serde_json::Value,
}

impl CartRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the user's cart lines in insertion order.
    ///
    /// Rows whose snapshot cannot be decoded or fails validation are
    /// skipped with a warning rather than failing the whole read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn fetch_for_user(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT product_id, quantity, snapshot
            FROM cart_items
            WHERE user_id = $1
            ORDER BY added_at, product_id
            ",
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let snapshot: LineSnapshot = match serde_json::from_value(row.snapshot) {
                Ok(s) => s,
                Err(e) => {
                    warn!(user = %user, product_id = row.product_id, error = %e,
                          "skipping cart row with undecodable snapshot");
                    continue;
                }
            };
            if let Err(e) = snapshot.validate() {
                warn!(user = %user, product_id = row.product_id, error = %e,
                      "skipping cart row with invalid snapshot");
                continue;
            }
            let quantity = u32::try_from(row.quantity.max(1)).unwrap_or(1);
            lines.push(snapshot.into_line(ProductId::new(row.product_id), quantity));
        }
        Ok(lines)
    }

    /// Replace the user's entire remote cart with the given line set.
    ///
    /// An empty line set leaves the user with no rows, which is how a cart
    /// clear reaches the durable store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a line fails snapshot
    /// validation, `RepositoryError::Database` if a statement fails.
    pub async fn replace_all_for_user(
        &self,
        user: UserId,
        lines: &[CartLine],
    ) -> Result<(), RepositoryError> {
        // Validate before touching the store so a bad line cannot leave the
        // user's cart half-written.
        let mut snapshots = Vec::with_capacity(lines.len());
        for line in lines {
            let snapshot = LineSnapshot::from(line);
            snapshot
                .validate()
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
            let value = serde_json::to_value(&snapshot)
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
            snapshots.push((line, value));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user.as_uuid())
            .execute(&mut *tx)
            .await?;

        for (line, snapshot) in snapshots {
            sqlx::query(
                r"
                INSERT INTO cart_items (user_id, product_id, variant, quantity, snapshot)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(user.as_uuid())
            .bind(line.product_id.as_i32())
            .bind(line.variant.as_deref().unwrap_or(DEFAULT_VARIANT))
            .bind(i32::try_from(line.quantity).unwrap_or(i32::MAX))
            .bind(snapshot)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

impl RemoteCartStore for CartRepository {
    async fn fetch(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        self.fetch_for_user(user).await
    }

    async fn replace_all(&self, user: UserId, lines: &[CartLine]) -> Result<(), RepositoryError> {
        self.replace_all_for_user(user, lines).await
    }
}
