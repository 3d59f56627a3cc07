//! Cart route handlers.
//!
//! Mutations return the full cart view plus an `HX-Trigger` header so the
//! client can refresh dependent fragments (count badge, cart sheet).

use axum::{
    Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hk_leather_core::{ProductId, format_pkr};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::cart::{Cart, NewCartItem};
use crate::services::cart::SessionCartStore;
use crate::services::pending::{self, SessionPendingSlot};
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, serde::Serialize)]
pub struct CartItemView {
    pub product_id: i32,
    pub name: String,
    pub variant: Option<String>,
    pub category: String,
    pub image: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Cart display data.
#[derive(Debug, serde::Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| CartItemView {
                    product_id: line.product_id.as_i32(),
                    name: line.name.clone(),
                    variant: line.variant.clone(),
                    category: line.category.clone(),
                    image: line.image.clone(),
                    quantity: line.quantity,
                    unit_price: format_pkr(line.unit_price),
                    line_total: format_pkr(
                        line.unit_price * rust_decimal::Decimal::from(line.quantity),
                    ),
                })
                .collect(),
            subtotal: format_pkr(cart.total_price()),
            item_count: cart.total_items(),
        }
    }
}

/// Update cart quantity payload.
#[derive(Debug, Deserialize)]
pub struct UpdateCartPayload {
    pub product_id: i32,
    pub quantity: i32,
    pub variant: Option<String>,
}

/// Remove from cart payload.
#[derive(Debug, Deserialize)]
pub struct RemoveCartPayload {
    pub product_id: i32,
    pub variant: Option<String>,
}

/// Get the current cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let local = SessionCartStore::new(&session);
    let cart = state.carts().current(&local).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add one unit of a product to the cart.
///
/// Signals the client to reveal the cart sheet via `HX-Trigger`.
#[instrument(skip(state, session, item), fields(product_id = item.product_id.as_i32()))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Json(item): Json<NewCartItem>,
) -> Result<Response> {
    let local = SessionCartStore::new(&session);
    let cart = state.carts().add_item(&local, user, item).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-opened")]),
        Json(CartView::from(&cart)),
    )
        .into_response())
}

/// Overwrite a line's quantity (zero or less removes it).
#[instrument(skip(state, session, payload))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateCartPayload>,
) -> Result<Response> {
    let local = SessionCartStore::new(&session);
    let cart = state
        .carts()
        .set_quantity(
            &local,
            user,
            ProductId::new(payload.product_id),
            payload.quantity,
            payload.variant.as_deref(),
        )
        .await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        Json(CartView::from(&cart)),
    )
        .into_response())
}

/// Remove a line from the cart.
#[instrument(skip(state, session, payload))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<RemoveCartPayload>,
) -> Result<Response> {
    let local = SessionCartStore::new(&session);
    let cart = state
        .carts()
        .remove_item(
            &local,
            user,
            ProductId::new(payload.product_id),
            payload.variant.as_deref(),
        )
        .await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        Json(CartView::from(&cart)),
    )
        .into_response())
}

/// Clear the cart for the current identity.
#[instrument(skip(state, session))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> Result<Response> {
    let local = SessionCartStore::new(&session);
    state.carts().clear(&local, user).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        Json(CartView::from(&Cart::default())),
    )
        .into_response())
}

/// Get the cart count badge value.
#[instrument(skip(state, session))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<serde_json::Value>> {
    let local = SessionCartStore::new(&session);
    let cart = state.carts().current(&local).await?;
    Ok(Json(serde_json::json!({ "count": cart.total_items() })))
}

/// Record an add-to-cart intent from an unauthenticated actor.
///
/// The client calls this before redirecting to the sign-in flow; the item
/// is added automatically once authentication completes.
#[instrument(skip(session, item), fields(product_id = item.product_id.as_i32()))]
pub async fn set_pending(session: Session, Json(item): Json<NewCartItem>) -> Result<Response> {
    let slot = SessionPendingSlot::new(&session);
    pending::set_pending(&slot, item).await?;
    Ok(axum::http::StatusCode::NO_CONTENT.into_response())
}

/// Cancel a pending add-to-cart intent (sign-in abandoned).
#[instrument(skip(session))]
pub async fn clear_pending(session: Session) -> Result<Response> {
    let slot = SessionPendingSlot::new(&session);
    pending::clear_pending(&slot).await?;
    Ok(axum::http::StatusCode::NO_CONTENT.into_response())
}
