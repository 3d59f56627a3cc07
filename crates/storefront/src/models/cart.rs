//! Cart domain types and the pure cart algebra.
//!
//! A cart is an ordered list of line items, keyed by `(product, variant)`.
//! All mutation rules live here as pure functions so the sync machinery in
//! `services::cart` stays a thin orchestration layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hk_leather_core::ProductId;

/// Variant key used when a product has no explicit variant.
pub const DEFAULT_VARIANT: &str = "default";

/// Identity of a cart line: one line per `(product, variant)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub variant: String,
}

impl LineKey {
    /// Build a key, normalizing a missing variant to [`DEFAULT_VARIANT`].
    #[must_use]
    pub fn new(product_id: ProductId, variant: Option<&str>) -> Self {
        Self {
            product_id,
            variant: variant.unwrap_or(DEFAULT_VARIANT).to_owned(),
        }
    }
}

/// Payload for adding a product to the cart (a line item minus quantity).
///
/// This is also the pending-intent payload carried across the sign-in
/// redirect, so it derives serde in both directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub image: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub image: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    /// Identity key for this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id, self.variant.as_deref())
    }

    /// Display name with the variant folded in, e.g. `"Tote Bag (Large)"`.
    ///
    /// Used for order snapshots so historical orders keep the variant text
    /// even if the catalog changes.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.variant {
            Some(v) => format!("{} ({v})", self.name),
            None => self.name.clone(),
        }
    }
}

impl From<NewCartItem> for CartLine {
    fn from(item: NewCartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name,
            unit_price: item.unit_price,
            image: item.image,
            category: item.category,
            variant: item.variant,
            quantity: 1,
        }
    }
}

/// A cart: an ordered sequence of line items, unique per [`LineKey`].
///
/// Order is insertion order; it is not significant to correctness. Totals
/// are always derived from the lines, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Wrap an existing set of lines (e.g. loaded from a store).
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity))
            .sum()
    }

    /// Add one unit of a product.
    ///
    /// If a line with the same identity key exists its quantity is
    /// incremented by 1; otherwise a new line with quantity 1 is appended.
    pub fn add(&mut self, item: NewCartItem) {
        let key = LineKey::new(item.product_id, item.variant.as_deref());
        match self.lines.iter_mut().find(|l| l.key() == key) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine::from(item)),
        }
    }

    /// Remove the line matching the identity key. No-op if absent.
    pub fn remove(&mut self, product_id: ProductId, variant: Option<&str>) {
        let key = LineKey::new(product_id, variant);
        self.lines.retain(|l| l.key() != key);
    }

    /// Overwrite the quantity of the matching line.
    ///
    /// A quantity of zero or less removes the line instead; no stored line
    /// ever has quantity below 1.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i32, variant: Option<&str>) {
        if quantity <= 0 {
            self.remove(product_id, variant);
            return;
        }
        let key = LineKey::new(product_id, variant);
        if let Some(line) = self.lines.iter_mut().find(|l| l.key() == key) {
            #[allow(clippy::cast_sign_loss)] // quantity > 0 checked above
            {
                line.quantity = quantity as u32;
            }
        }
    }

    /// Merge remote lines into this (local) cart with local precedence.
    ///
    /// Remote lines whose identity key is not present locally are appended;
    /// remote quantities for keys already present are discarded, not summed.
    /// Runs right after a redirect-driven sign-in, where the local session
    /// is the one actively being acted upon, so it wins ties.
    pub fn merge_remote(&mut self, remote: Vec<CartLine>) {
        for line in remote {
            if !self.lines.iter().any(|l| l.key() == line.key()) {
                self.lines.push(line);
            }
        }
    }
}

/// Snapshot of a line item's product data, stored as an explicit record
/// (jsonb column) rather than an opaque serialized string.
///
/// Validated at both the write and read boundaries; rows whose snapshot
/// fails validation are skipped on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// A snapshot that failed validation.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot has an empty product name")]
    EmptyName,
    #[error("snapshot has a negative price: {0}")]
    NegativePrice(Decimal),
}

impl LineSnapshot {
    /// Check the snapshot invariants: non-empty name, non-negative price.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.name.trim().is_empty() {
            return Err(SnapshotError::EmptyName);
        }
        if self.price < Decimal::ZERO {
            return Err(SnapshotError::NegativePrice(self.price));
        }
        Ok(())
    }

    /// Rebuild a cart line from a stored row.
    #[must_use]
    pub fn into_line(self, product_id: ProductId, quantity: u32) -> CartLine {
        CartLine {
            product_id,
            name: self.name,
            unit_price: self.price,
            image: self.image,
            category: self.category,
            variant: self.variant,
            quantity,
        }
    }
}

impl From<&CartLine> for LineSnapshot {
    fn from(line: &CartLine) -> Self {
        Self {
            name: line.name.clone(),
            price: line.unit_price,
            image: line.image.clone(),
            category: line.category.clone(),
            variant: line.variant.clone(),
        }
    }
}
