//! Sign-in transition hook.
//!
//! Token issuance and credential checks live in the external auth flow;
//! these handlers only react to the identity transition. The sign-in hook
//! is mounted behind the auth callback and is the single place where the
//! anonymous-to-authenticated cart merge and the pending-intent
//! consumption run.

use axum::{
    Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use hk_leather_core::UserId;

use crate::error::Result;
use crate::models::session::keys;
use crate::routes::cart::CartView;
use crate::services::cart::SessionCartStore;
use crate::services::pending::{self, SessionPendingSlot};
use crate::state::AppState;

/// Payload from the auth callback.
#[derive(Debug, Deserialize)]
pub struct SignedInPayload {
    pub user_id: Uuid,
}

/// Record a successful sign-in and run the identity transition.
///
/// Fires the cart merge exactly once per anonymous-to-authenticated
/// transition: a repeated call with the identity already in the session is
/// a no-op (the auth page can re-render without re-merging).
#[instrument(skip(state, session, payload))]
pub async fn signed_in(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<SignedInPayload>,
) -> Result<Response> {
    let user = UserId::new(payload.user_id);
    let local = SessionCartStore::new(&session);

    // A store read failure must surface, not silently look like "no prior
    // identity"; the insert below reports the same store's errors.
    let existing: Option<UserId> = session
        .get(keys::CURRENT_USER)
        .await
        .map_err(|e| crate::services::cart::SlotError(e.to_string()))?;
    if existing == Some(user) {
        let cart = state.carts().current(&local).await?;
        return Ok(Json(CartView::from(&cart)).into_response());
    }

    session
        .insert(keys::CURRENT_USER, user)
        .await
        .map_err(|e| crate::services::cart::SlotError(e.to_string()))?;

    // Merge the anonymous cart with the user's durable cart, then replay
    // the add-to-cart intent that triggered the sign-in (if any).
    let mut cart = state.carts().identity_transition(&local, user).await?;

    let slot = SessionPendingSlot::new(&session);
    if let Some(updated) =
        pending::consume_on_authenticated(&slot, state.carts(), &local, user).await?
    {
        cart = updated;
    }

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        Json(CartView::from(&cart)),
    )
        .into_response())
}

/// Drop the signed-in identity (logout).
///
/// The local cart slot is left as-is; it simply stops syncing remotely.
#[instrument(skip(session))]
pub async fn signed_out(session: Session) -> Result<Response> {
    session
        .remove::<UserId>(keys::CURRENT_USER)
        .await
        .map_err(|e| crate::services::cart::SlotError(e.to_string()))?;
    Ok(axum::http::StatusCode::NO_CONTENT.into_response())
}
