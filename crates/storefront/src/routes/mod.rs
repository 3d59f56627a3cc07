//! Route definitions for the storefront JSON API.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Cart
        .route("/cart", get(cart::show).delete(cart::clear))
        .route(
            "/cart/items",
            post(cart::add).patch(cart::update).delete(cart::remove),
        )
        .route("/cart/count", get(cart::count))
        .route(
            "/cart/pending",
            post(cart::set_pending).delete(cart::clear_pending),
        )
        // Checkout
        .route("/checkout", post(checkout::place_order))
        // Contact
        .route("/contact", post(contact::submit))
        // Orders
        .route("/orders", get(orders::list))
        .route("/orders/{order_id}", get(orders::show))
        // Identity transition hooks
        .route("/auth/session", post(auth::signed_in).delete(auth::signed_out))
}
