//! Contact message repository.
//!
//! Messages are write-only from the storefront; reading and follow-up
//! happen in back-office tooling.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::forms::ValidContact;

/// Repository for customer contact messages.
#[derive(Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a validated contact message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, message: &ValidContact) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO contact_messages (name, email, phone, message)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&message.name)
        .bind(&message.email)
        .bind(message.phone.as_deref())
        .bind(&message.message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
