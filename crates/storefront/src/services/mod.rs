//! Application services: cart reconciliation, order placement, and the
//! pending-intent relay.

pub mod cart;
pub mod checkout;
pub mod pending;
pub mod sync;

pub use cart::{CartService, LocalCartStore, RemoteCartStore, SessionCartStore, SlotError};
pub use checkout::{CheckoutError, CheckoutService, OrderStore, ProfileStore, ShippingPolicy};
pub use sync::SyncQueue;
