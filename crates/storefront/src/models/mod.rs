//! Domain models for the storefront.

pub mod cart;
pub mod forms;
pub mod order;
pub mod session;

pub use cart::{Cart, CartLine, LineKey, LineSnapshot, NewCartItem, SnapshotError};
pub use forms::{CheckoutForm, ContactForm, FieldErrors, ValidCheckout, ValidContact};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderSummary, ShippingProfile};
