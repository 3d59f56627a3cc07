//! Pending-intent relay.
//!
//! Preserves a single "add item X" intent across the sign-in redirect. The
//! slot holds at most one item; setting overwrites, consumption happens
//! once per successful authentication and clears the slot unconditionally
//! so re-renders cannot re-add the item.

use std::future::Future;

use tower_sessions::Session;
use tracing::instrument;

use hk_leather_core::UserId;

use crate::models::cart::{Cart, NewCartItem};
use crate::models::session::keys;
use crate::services::cart::{CartService, LocalCartStore, RemoteCartStore, SlotError};

/// The redirect-surviving slot holding the pending item.
pub trait PendingSlot: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Option<NewCartItem>, SlotError>> + Send;

    fn store(&self, item: &NewCartItem) -> impl Future<Output = Result<(), SlotError>> + Send;

    fn clear(&self) -> impl Future<Output = Result<(), SlotError>> + Send;
}

/// Session-backed [`PendingSlot`].
pub struct SessionPendingSlot<'a> {
    session: &'a Session,
}

impl<'a> SessionPendingSlot<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }
}

impl PendingSlot for SessionPendingSlot<'_> {
    async fn load(&self) -> Result<Option<NewCartItem>, SlotError> {
        self.session
            .get(keys::PENDING_ITEM)
            .await
            .map_err(|e| SlotError(e.to_string()))
    }

    async fn store(&self, item: &NewCartItem) -> Result<(), SlotError> {
        self.session
            .insert(keys::PENDING_ITEM, item)
            .await
            .map_err(|e| SlotError(e.to_string()))
    }

    async fn clear(&self) -> Result<(), SlotError> {
        self.session
            .remove::<NewCartItem>(keys::PENDING_ITEM)
            .await
            .map_err(|e| SlotError(e.to_string()))?;
        Ok(())
    }
}

/// Record an add-to-cart intent from an unauthenticated actor, replacing
/// any previously pending item.
///
/// # Errors
///
/// Returns [`SlotError`] if the slot cannot be written.
#[instrument(skip_all, fields(product_id = %item.product_id))]
pub async fn set_pending<S: PendingSlot>(slot: &S, item: NewCartItem) -> Result<(), SlotError> {
    slot.store(&item).await
}

/// Cancel a pending intent (e.g. the user abandoned sign-in).
///
/// # Errors
///
/// Returns [`SlotError`] if the slot cannot be cleared.
pub async fn clear_pending<S: PendingSlot>(slot: &S) -> Result<(), SlotError> {
    slot.clear().await
}

/// Consume the pending intent after a successful authentication.
///
/// Adds the pending item (if any) through the reconciler, then clears the
/// slot whether or not the add succeeded. Returns the updated cart when an
/// item was consumed.
///
/// # Errors
///
/// Returns [`SlotError`] if the slot or the local cart slot fails.
#[instrument(skip(slot, carts, local), fields(user = %user))]
pub async fn consume_on_authenticated<S, R, L>(
    slot: &S,
    carts: &CartService<R>,
    local: &L,
    user: UserId,
) -> Result<Option<Cart>, SlotError>
where
    S: PendingSlot,
    R: RemoteCartStore,
    L: LocalCartStore,
{
    let Some(item) = slot.load().await? else {
        return Ok(None);
    };

    let added = carts.add_item(local, Some(user), item).await;

    // Clear before surfacing any add failure: the intent is single-use.
    slot.clear().await?;

    added.map(Some)
}
