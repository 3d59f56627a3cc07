//! Session-stored state and keys.
//!
//! The session is the device-local persistent slot: it survives reloads,
//! is scoped to one browser, and holds the anonymous cart, the signed-in
//! identity, and the pending add-to-cart intent.

/// Session keys.
pub mod keys {
    /// Key for the local cart line items.
    pub const CART: &str = "cart";

    /// Key for the signed-in user's ID.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the pending add-to-cart intent carried across sign-in.
    pub const PENDING_ITEM: &str = "pending_cart_item";
}
