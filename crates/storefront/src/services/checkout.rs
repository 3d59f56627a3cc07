//! Order placement pipeline.
//!
//! Converts a reconciled, non-empty cart plus validated shipping/payment
//! input into a durable order, or fails cleanly with nothing user-visible
//! written. Preconditions short-circuit in a fixed order (identity, input,
//! cart), then three sequential durable writes run: order header, line
//! items, best-effort profile update.

use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, instrument, warn};

use hk_leather_core::{OrderId, OrderStatus, UserId};

use crate::db::RepositoryError;
use crate::models::cart::Cart;
use crate::models::forms::{CheckoutForm, FieldErrors};
use crate::models::order::{NewOrder, NewOrderItem, ShippingProfile};
use crate::services::cart::{CartService, LocalCartStore, RemoteCartStore, SlotError};

/// Order placement failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Placement attempted without a signed-in identity.
    #[error("sign in required")]
    Unauthenticated,

    /// Field-level validation failure; no store writes occurred.
    #[error("invalid input: {0}")]
    InvalidInput(FieldErrors),

    /// Placement attempted on an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Header or line-item insert failed. The cart is preserved untouched,
    /// so retrying is safe (a retry creates a fresh order).
    #[error("order creation failed")]
    OrderCreationFailed,

    /// The local cart slot could not be read.
    #[error(transparent)]
    CartUnavailable(#[from] SlotError),
}

/// Durable order store consumed by the pipeline.
pub trait OrderStore: Send + Sync {
    fn insert_header(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<OrderId, RepositoryError>> + Send;

    fn insert_items(
        &self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Durable profile store consumed by the pipeline (best-effort step).
pub trait ProfileStore: Send + Sync {
    fn upsert(
        &self,
        user: UserId,
        profile: &ShippingProfile,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Shipping cost policy: free at or above the threshold, flat fee below.
#[derive(Debug, Clone)]
pub struct ShippingPolicy {
    pub flat_fee: Decimal,
    pub free_threshold: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            flat_fee: Decimal::from(500),
            free_threshold: Decimal::from(10_000),
        }
    }
}

impl ShippingPolicy {
    /// Shipping cost for a cart subtotal. The threshold is inclusive:
    /// a subtotal exactly at the threshold ships free.
    #[must_use]
    pub fn shipping_cost(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_threshold {
            Decimal::ZERO
        } else {
            self.flat_fee
        }
    }
}

/// The order placement service.
pub struct CheckoutService<O, P> {
    orders: Arc<O>,
    profiles: Arc<P>,
    policy: ShippingPolicy,
}

impl<O: OrderStore, P: ProfileStore> CheckoutService<O, P> {
    #[must_use]
    pub const fn new(orders: Arc<O>, profiles: Arc<P>, policy: ShippingPolicy) -> Self {
        Self {
            orders,
            profiles,
            policy,
        }
    }

    /// Place an order from the current cart.
    ///
    /// On full success the cart is cleared in both stores and the new
    /// order's ID is returned for navigation to the confirmation view. On
    /// any failure the cart and the submitted input are left intact.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]. A line-item insert failure after a successful
    /// header insert leaves an orphan header behind; the pipeline has no
    /// compensating transaction, and this is an accepted, documented risk.
    #[instrument(skip_all, fields(user = ?user))]
    pub async fn place_order<R: RemoteCartStore, L: LocalCartStore>(
        &self,
        carts: &CartService<R>,
        local: &L,
        user: Option<UserId>,
        form: CheckoutForm,
    ) -> Result<OrderId, CheckoutError> {
        // Preconditions, in order, before any store write.
        let user = user.ok_or(CheckoutError::Unauthenticated)?;
        let checkout = form.validate().map_err(CheckoutError::InvalidInput)?;
        let cart = carts.current(local).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let subtotal = cart.total_price();
        let total_amount = subtotal + self.policy.shipping_cost(subtotal);

        // Step 1: order header.
        let header = NewOrder {
            user_id: user,
            status: OrderStatus::Pending,
            total_amount,
            shipping_address: checkout.address.clone(),
            shipping_city: checkout.city.clone(),
            shipping_postal_code: checkout.postal_code.clone(),
            payment_method: checkout.payment_method,
            notes: checkout.notes.clone(),
        };
        let order_id = self.orders.insert_header(&header).await.map_err(|e| {
            error!(error = %e, "order header insert failed");
            CheckoutError::OrderCreationFailed
        })?;

        // Step 2: snapshotted line items. On failure the header stays (no
        // rollback) but the cart is untouched so the user can retry.
        let items = order_items_from(&cart);
        self.orders
            .insert_items(order_id, &items)
            .await
            .map_err(|e| {
                error!(order_id = %order_id, error = %e, "order item insert failed");
                CheckoutError::OrderCreationFailed
            })?;

        // Step 3: best-effort profile refresh; never fails the order.
        let profile = ShippingProfile {
            full_name: checkout.full_name(),
            phone: checkout.phone.clone(),
            address: checkout.address.clone(),
            city: checkout.city.clone(),
            postal_code: checkout.postal_code.clone(),
        };
        if let Err(e) = self.profiles.upsert(user, &profile).await {
            warn!(user = %user, error = %e, "profile update after order skipped");
        }

        // Success: the cart is cleared, not merely emptied.
        if let Err(e) = carts.clear(local, Some(user)).await {
            warn!(order_id = %order_id, error = %e, "cart clear after order failed");
        }

        Ok(order_id)
    }
}

/// Snapshot cart lines into order items, folding the variant into the name.
fn order_items_from(cart: &Cart) -> Vec<NewOrderItem> {
    cart.lines()
        .iter()
        .map(|line| NewOrderItem {
            product_name: line.display_name(),
            product_image: line.image.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
        })
        .collect()
}
