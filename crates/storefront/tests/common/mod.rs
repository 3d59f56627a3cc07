//! Shared in-memory test doubles for the cart and checkout services.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use rust_decimal::Decimal;

use hk_leather_core::{OrderId, ProductId, UserId};
use hk_leather_storefront::db::RepositoryError;
use hk_leather_storefront::models::cart::{Cart, CartLine, NewCartItem};
use hk_leather_storefront::models::forms::CheckoutForm;
use hk_leather_storefront::models::order::{NewOrder, NewOrderItem, ShippingProfile};
use hk_leather_storefront::services::cart::{LocalCartStore, RemoteCartStore, SlotError};
use hk_leather_storefront::services::checkout::{OrderStore, ProfileStore};
use hk_leather_storefront::services::pending::PendingSlot;

/// In-memory device-local cart slot.
///
/// `None` means the slot is unset, which is distinct from an empty cart.
#[derive(Default)]
pub struct InMemoryLocal {
    slot: Mutex<Option<Cart>>,
}

impl InMemoryLocal {
    pub fn slot(&self) -> Option<Cart> {
        self.slot.lock().unwrap().clone()
    }

    pub fn seed(&self, cart: Cart) {
        *self.slot.lock().unwrap() = Some(cart);
    }
}

impl LocalCartStore for InMemoryLocal {
    async fn load(&self) -> Result<Cart, SlotError> {
        Ok(self.slot.lock().unwrap().clone().unwrap_or_default())
    }

    async fn store(&self, cart: &Cart) -> Result<(), SlotError> {
        *self.slot.lock().unwrap() = Some(cart.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SlotError> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}

/// Recording remote cart store with switchable read/write failure modes.
#[derive(Default)]
pub struct InMemoryRemote {
    pub state: Mutex<HashMap<UserId, Vec<CartLine>>>,
    pub writes: Mutex<u32>,
    pub fail_writes: Mutex<bool>,
    pub fail_reads: Mutex<bool>,
}

impl InMemoryRemote {
    pub fn seed(&self, user: UserId, lines: Vec<CartLine>) {
        self.state.lock().unwrap().insert(user, lines);
    }

    pub fn lines_for(&self, user: UserId) -> Option<Vec<CartLine>> {
        self.state.lock().unwrap().get(&user).cloned()
    }

    pub fn write_count(&self) -> u32 {
        *self.writes.lock().unwrap()
    }
}

impl RemoteCartStore for InMemoryRemote {
    async fn fetch(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        if *self.fail_reads.lock().unwrap() {
            return Err(RepositoryError::DataCorruption("injected read".to_owned()));
        }
        Ok(self.state.lock().unwrap().get(&user).cloned().unwrap_or_default())
    }

    async fn replace_all(&self, user: UserId, lines: &[CartLine]) -> Result<(), RepositoryError> {
        *self.writes.lock().unwrap() += 1;
        if *self.fail_writes.lock().unwrap() {
            return Err(RepositoryError::DataCorruption("injected write".to_owned()));
        }
        self.state.lock().unwrap().insert(user, lines.to_vec());
        Ok(())
    }
}

/// In-memory pending-intent slot.
#[derive(Default)]
pub struct InMemoryPending {
    slot: Mutex<Option<NewCartItem>>,
}

impl InMemoryPending {
    pub fn slot(&self) -> Option<NewCartItem> {
        self.slot.lock().unwrap().clone()
    }
}

impl PendingSlot for InMemoryPending {
    async fn load(&self) -> Result<Option<NewCartItem>, SlotError> {
        Ok(self.slot.lock().unwrap().clone())
    }

    async fn store(&self, item: &NewCartItem) -> Result<(), SlotError> {
        *self.slot.lock().unwrap() = Some(item.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SlotError> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}

/// Recording order store with per-step failure switches.
#[derive(Default)]
pub struct RecordingOrders {
    pub headers: Mutex<Vec<NewOrder>>,
    pub items: Mutex<Vec<(OrderId, Vec<NewOrderItem>)>>,
    pub fail_header: Mutex<bool>,
    pub fail_items: Mutex<bool>,
}

impl RecordingOrders {
    pub fn header_count(&self) -> usize {
        self.headers.lock().unwrap().len()
    }

    pub fn last_header(&self) -> Option<NewOrder> {
        self.headers.lock().unwrap().last().cloned()
    }

    pub fn last_items(&self) -> Option<Vec<NewOrderItem>> {
        self.items.lock().unwrap().last().map(|(_, items)| items.clone())
    }
}

impl OrderStore for RecordingOrders {
    async fn insert_header(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        if *self.fail_header.lock().unwrap() {
            return Err(RepositoryError::DataCorruption("injected header".to_owned()));
        }
        self.headers.lock().unwrap().push(order.clone());
        Ok(OrderId::generate())
    }

    async fn insert_items(
        &self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<(), RepositoryError> {
        if *self.fail_items.lock().unwrap() {
            return Err(RepositoryError::DataCorruption("injected items".to_owned()));
        }
        self.items.lock().unwrap().push((order_id, items.to_vec()));
        Ok(())
    }
}

/// Recording profile store with a failure switch.
#[derive(Default)]
pub struct RecordingProfiles {
    pub upserts: Mutex<Vec<(UserId, ShippingProfile)>>,
    pub fail: Mutex<bool>,
}

impl RecordingProfiles {
    pub fn upsert_count(&self) -> usize {
        self.upserts.lock().unwrap().len()
    }
}

impl ProfileStore for RecordingProfiles {
    async fn upsert(&self, user: UserId, profile: &ShippingProfile) -> Result<(), RepositoryError> {
        if *self.fail.lock().unwrap() {
            return Err(RepositoryError::DataCorruption("injected profile".to_owned()));
        }
        self.upserts.lock().unwrap().push((user, profile.clone()));
        Ok(())
    }
}

pub fn item(id: i32, variant: Option<&str>, price: i64) -> NewCartItem {
    NewCartItem {
        product_id: ProductId::new(id),
        name: format!("Product {id}"),
        unit_price: Decimal::from(price),
        image: format!("/images/{id}.jpg"),
        category: "bags".to_owned(),
        variant: variant.map(str::to_owned),
    }
}

pub fn line(id: i32, variant: Option<&str>, price: i64, qty: u32) -> CartLine {
    let mut l = CartLine::from(item(id, variant, price));
    l.quantity = qty;
    l
}

/// A checkout form that passes validation.
pub fn valid_form() -> CheckoutForm {
    CheckoutForm {
        first_name: "Ayesha".to_owned(),
        last_name: "Khan".to_owned(),
        email: "ayesha@example.com".to_owned(),
        phone: "03001234567".to_owned(),
        address: "12 Mall Road".to_owned(),
        city: "Lahore".to_owned(),
        postal_code: Some("54000".to_owned()),
        notes: None,
        payment_method: "cod".to_owned(),
    }
}

/// Poll until `condition` holds, for asserting on background sync effects.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within timeout");
}
