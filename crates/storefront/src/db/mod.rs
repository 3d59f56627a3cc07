//! Database operations for the storefront `PostgreSQL`.
//!
//! # Tables
//!
//! - `cart_items` - one row per cart line per user (the remote cart store)
//! - `orders` / `order_items` - immutable order records with snapshots
//! - `profiles` - shipping profile per user, upserted at checkout
//! - `contact_messages` - customer messages from the contact form
//! - `sessions` - tower-sessions storage (the device-local slot)
//!
//! # Migrations
//!
//! SQL files live in `crates/storefront/migrations/` and are applied with
//! `sqlx migrate run` (or any SQL runner) before first start.

pub mod carts;
pub mod contact;
pub mod orders;
pub mod profiles;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use contact::ContactRepository;
pub use orders::OrderRepository;
pub use profiles::ProfileRepository;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
