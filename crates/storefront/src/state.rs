//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{CartRepository, ContactRepository, OrderRepository, ProfileRepository};
use crate::services::cart::CartService;
use crate::services::checkout::CheckoutService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the database pool, the
/// cart reconciler (with its per-user remote write queue), and the order
/// placement pipeline.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    carts: CartService<CartRepository>,
    checkout: CheckoutService<OrderRepository, ProfileRepository>,
    orders: OrderRepository,
    contact: ContactRepository,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let cart_repo = Arc::new(CartRepository::new(pool.clone()));
        let order_repo = OrderRepository::new(pool.clone());
        let profile_repo = Arc::new(ProfileRepository::new(pool.clone()));

        let carts = CartService::new(cart_repo);
        let checkout = CheckoutService::new(
            Arc::new(order_repo.clone()),
            profile_repo,
            config.shipping.policy(),
        );

        let contact = ContactRepository::new(pool.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                carts,
                checkout,
                orders: order_repo,
                contact,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cart reconciler.
    #[must_use]
    pub fn carts(&self) -> &CartService<CartRepository> {
        &self.inner.carts
    }

    /// Get a reference to the order placement pipeline.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService<OrderRepository, ProfileRepository> {
        &self.inner.checkout
    }

    /// Get a reference to the order repository (history/confirmation reads).
    #[must_use]
    pub fn orders(&self) -> &OrderRepository {
        &self.inner.orders
    }

    /// Get a reference to the contact message repository.
    #[must_use]
    pub fn contact(&self) -> &ContactRepository {
        &self.inner.contact
    }
}
