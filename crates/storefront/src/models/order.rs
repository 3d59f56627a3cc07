//! Order domain types.
//!
//! Orders are immutable once created; only `status` changes, and only via
//! back-office tooling outside this service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use hk_leather_core::{OrderId, OrderStatus, PaymentMethod, UserId};

/// A placed order as read back from the store.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_postal_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A snapshotted line of a placed order.
///
/// Product data is copied at commit time; later catalog changes never
/// retroactively alter a placed order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub product_name: String,
    pub product_image: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Listing row for the order history view: header fields plus item count.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Order header to be inserted by the placement pipeline.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_postal_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Order line to be inserted by the placement pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_name: String,
    pub product_image: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Shipping profile upserted (best-effort) after a successful order.
#[derive(Debug, Clone)]
pub struct ShippingProfile {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: Option<String>,
}
