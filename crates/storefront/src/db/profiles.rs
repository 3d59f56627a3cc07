//! Shipping profile repository.
//!
//! The profile is refreshed (best-effort) from the shipping details of each
//! successful order, so returning customers see their latest address.

use sqlx::PgPool;

use hk_leather_core::UserId;

use super::RepositoryError;
use crate::models::order::ShippingProfile;
use crate::services::checkout::ProfileStore;

/// Repository for per-user shipping profiles.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update the user's shipping profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert_for_user(
        &self,
        user: UserId,
        profile: &ShippingProfile,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO profiles (user_id, full_name, phone, address, city, postal_code, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, now())
            ON CONFLICT (user_id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                postal_code = EXCLUDED.postal_code,
                updated_at = now()
            ",
        )
        .bind(user.as_uuid())
        .bind(&profile.full_name)
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(profile.postal_code.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl ProfileStore for ProfileRepository {
    async fn upsert(&self, user: UserId, profile: &ShippingProfile) -> Result<(), RepositoryError> {
        self.upsert_for_user(user, profile).await
    }
}
