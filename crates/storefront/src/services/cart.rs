//! Cart reconciliation service.
//!
//! One logically-consistent cart per actor, kept across two physical stores
//! with different lifetimes:
//!
//! - the **local** store (the session slot): synchronous source of truth
//!   for the current device, written on every mutation;
//! - the **remote** store (Postgres rows): durable per-user copy, written
//!   only when a signed-in identity is present, always as a full replace
//!   through the per-identity [`SyncQueue`].
//!
//! Remote failures never block or roll back a local mutation.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tower_sessions::Session;
use tracing::{instrument, warn};

use hk_leather_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::models::cart::{Cart, CartLine, NewCartItem};
use crate::models::session::keys;
use crate::services::sync::SyncQueue;

/// Error accessing the device-local cart slot.
#[derive(Debug, Error)]
#[error("local cart slot error: {0}")]
pub struct SlotError(pub String);

/// The device-local persistent cart slot.
///
/// Survives reloads, scoped to one browser. Production backs this with the
/// session; tests use an in-memory slot.
pub trait LocalCartStore: Send + Sync {
    /// Load the cart, empty if the slot is unset.
    fn load(&self) -> impl Future<Output = Result<Cart, SlotError>> + Send;

    /// Persist the cart.
    fn store(&self, cart: &Cart) -> impl Future<Output = Result<(), SlotError>> + Send;

    /// Remove the slot entirely (clear, not store-empty).
    fn clear(&self) -> impl Future<Output = Result<(), SlotError>> + Send;
}

/// The durable per-user cart store.
pub trait RemoteCartStore: Send + Sync + 'static {
    /// Fetch all cart lines for a user.
    fn fetch(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<CartLine>, RepositoryError>> + Send;

    /// Replace the user's entire cart with `lines` (full-replace discipline).
    fn replace_all(
        &self,
        user: UserId,
        lines: &[CartLine],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Session-backed [`LocalCartStore`].
pub struct SessionCartStore<'a> {
    session: &'a Session,
}

impl<'a> SessionCartStore<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }
}

impl LocalCartStore for SessionCartStore<'_> {
    async fn load(&self) -> Result<Cart, SlotError> {
        let lines: Option<Vec<CartLine>> = self
            .session
            .get(keys::CART)
            .await
            .map_err(|e| SlotError(e.to_string()))?;
        Ok(Cart::from_lines(lines.unwrap_or_default()))
    }

    async fn store(&self, cart: &Cart) -> Result<(), SlotError> {
        self.session
            .insert(keys::CART, cart.lines())
            .await
            .map_err(|e| SlotError(e.to_string()))
    }

    async fn clear(&self) -> Result<(), SlotError> {
        self.session
            .remove::<Vec<CartLine>>(keys::CART)
            .await
            .map_err(|e| SlotError(e.to_string()))?;
        Ok(())
    }
}

/// The cart reconciler.
///
/// Stateless across requests: the local store is passed per call (it is
/// request-scoped), while the remote store and its write queue are shared.
pub struct CartService<R> {
    remote: Arc<R>,
    sync: SyncQueue<R>,
}

impl<R: RemoteCartStore> CartService<R> {
    #[must_use]
    pub fn new(remote: Arc<R>) -> Self {
        let sync = SyncQueue::new(Arc::clone(&remote));
        Self { remote, sync }
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError`] if the local slot cannot be read or written.
    #[instrument(skip(self, local, item), fields(product_id = %item.product_id))]
    pub async fn add_item<L: LocalCartStore>(
        &self,
        local: &L,
        user: Option<UserId>,
        item: NewCartItem,
    ) -> Result<Cart, SlotError> {
        let mut cart = local.load().await?;
        cart.add(item);
        self.persist(local, user, &cart).await?;
        Ok(cart)
    }

    /// Remove the line matching `(product_id, variant)`. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError`] if the local slot cannot be read or written.
    #[instrument(skip(self, local))]
    pub async fn remove_item<L: LocalCartStore>(
        &self,
        local: &L,
        user: Option<UserId>,
        product_id: ProductId,
        variant: Option<&str>,
    ) -> Result<Cart, SlotError> {
        let mut cart = local.load().await?;
        cart.remove(product_id, variant);
        self.persist(local, user, &cart).await?;
        Ok(cart)
    }

    /// Overwrite a line's quantity; zero or negative removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError`] if the local slot cannot be read or written.
    #[instrument(skip(self, local))]
    pub async fn set_quantity<L: LocalCartStore>(
        &self,
        local: &L,
        user: Option<UserId>,
        product_id: ProductId,
        quantity: i32,
        variant: Option<&str>,
    ) -> Result<Cart, SlotError> {
        let mut cart = local.load().await?;
        cart.set_quantity(product_id, quantity, variant);
        self.persist(local, user, &cart).await?;
        Ok(cart)
    }

    /// Clear the cart in both stores for the current identity.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError`] if the local slot cannot be cleared.
    #[instrument(skip(self, local))]
    pub async fn clear<L: LocalCartStore>(
        &self,
        local: &L,
        user: Option<UserId>,
    ) -> Result<(), SlotError> {
        local.clear().await?;
        if let Some(user) = user {
            self.sync.push(user, Vec::new());
        }
        Ok(())
    }

    /// Load the current cart without mutating it.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError`] if the local slot cannot be read.
    pub async fn current<L: LocalCartStore>(&self, local: &L) -> Result<Cart, SlotError> {
        local.load().await
    }

    /// Merge the anonymous local cart with the user's remote cart on the
    /// anonymous-to-authenticated transition.
    ///
    /// Local lines win ties; remote lines not present locally are adopted;
    /// the merged result is pushed back to the remote store in full. A
    /// remote read failure degrades to "remote empty" rather than failing
    /// the sign-in. If both sides are empty nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError`] if the local slot cannot be read or written.
    #[instrument(skip(self, local), fields(user = %user))]
    pub async fn identity_transition<L: LocalCartStore>(
        &self,
        local: &L,
        user: UserId,
    ) -> Result<Cart, SlotError> {
        let remote_lines = match self.remote.fetch(user).await {
            Ok(lines) => lines,
            Err(e) => {
                warn!(error = %e, "remote cart read failed during sign-in; treating as empty");
                Vec::new()
            }
        };

        let mut cart = local.load().await?;
        let both_empty = cart.is_empty() && remote_lines.is_empty();
        cart.merge_remote(remote_lines);

        if both_empty {
            return Ok(cart);
        }

        self.persist(local, Some(user), &cart).await?;
        Ok(cart)
    }

    /// Write-through: local always, remote (via the queue) only when a
    /// signed-in identity is present. An empty cart removes the local slot
    /// instead of storing an empty list.
    async fn persist<L: LocalCartStore>(
        &self,
        local: &L,
        user: Option<UserId>,
        cart: &Cart,
    ) -> Result<(), SlotError> {
        if cart.is_empty() {
            local.clear().await?;
        } else {
            local.store(cart).await?;
        }
        if let Some(user) = user {
            self.sync.push(user, cart.lines().to_vec());
        }
        Ok(())
    }
}
