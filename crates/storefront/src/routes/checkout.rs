//! Checkout route handler.

use axum::{Json, extract::State};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::forms::CheckoutForm;
use crate::services::cart::SessionCartStore;
use crate::state::AppState;

/// Place an order from the current cart.
///
/// On success the response carries the new order ID for navigation to the
/// confirmation view; the cart has been cleared. On failure the cart and
/// the submitted form are left intact for correction and retry.
#[instrument(skip(state, session, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<serde_json::Value>> {
    let local = SessionCartStore::new(&session);
    let order_id = state
        .checkout()
        .place_order(state.carts(), &local, user, form)
        .await?;

    Ok(Json(json!({ "order_id": order_id })))
}
