use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CoreError;

use super::money::Price;
use super::product::{self, Product, ProductId};

/// Field names owned by `LineItem` itself; never duplicated into `metadata`.
const RESERVED_FIELDS: [&str; 4] = ["id", "name", "price", "quantity"];

/// One product entry in the cart.
///
/// `quantity` is at least 1 for every line held by a `Ledger`; a line whose
/// quantity would drop to zero is removed instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Unit price
    pub price: Price,

    pub quantity: u32,

    /// Descriptive fields (image, variant, stock, ...) carried verbatim.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl LineItem {
    pub fn new(id: impl Into<ProductId>, price: Price, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: None,
            price,
            quantity,
            metadata: Map::new(),
        }
    }

    fn from_product(product: &Product, quantity: u32) -> Self {
        let metadata = product
            .metadata
            .iter()
            .filter(|(k, _)| !RESERVED_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self {
            id: product.id.clone(),
            name: Some(product.name.clone()),
            price: product.price,
            quantity,
            metadata,
        }
    }

    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }

    /// Pre-sale unit price carried over from the listing.
    #[must_use]
    pub fn original_price(&self) -> Option<Price> {
        product::original_price(&self.metadata)
    }

    /// Whole-percent markdown shown next to the line, 0 when not on sale.
    #[must_use]
    pub fn sale_percent(&self) -> u8 {
        self.original_price()
            .map_or(0, |original| self.price.percent_off(original))
    }

    /// Stock ceiling, if the listing provided one.
    #[must_use]
    pub fn stock(&self) -> Option<u64> {
        self.metadata.get("stock").and_then(Value::as_u64)
    }

    /// Whether the quantity has reached the advertised stock ceiling.
    /// Lines without a ceiling are never at their limit.
    #[must_use]
    pub fn at_stock_limit(&self) -> bool {
        self.stock().is_some_and(|s| u64::from(self.quantity) >= s)
    }
}

/// Totals derived from the ledger contents. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Σ price × quantity
    pub subtotal: Decimal,
    /// Σ quantity
    pub item_count: u64,
}

/// The authoritative list of cart lines.
///
/// Lines are kept in insertion order and are unique by `id`. Totals are
/// folded from the lines on every call to [`Ledger::totals`], so there is
/// no cached figure that could drift from the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    items: Vec<LineItem>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted lines.
    ///
    /// Quantities are restored directly. Lines with quantity 0 are dropped
    /// and repeated ids are merged into the first occurrence.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let mut ledger = Self::new();
        for item in items {
            if item.quantity == 0 {
                tracing::debug!(id = %item.id, "dropping stored cart line with zero quantity");
                continue;
            }
            match ledger.position(&item.id) {
                Some(idx) => {
                    tracing::debug!(id = %item.id, "merging duplicate stored cart line");
                    let existing = &mut ledger.items[idx];
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => ledger.items.push(item),
            }
        }
        ledger
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Add `qty` units of a product.
    ///
    /// Increments an existing line or appends a new one. Adding zero units
    /// is a no-op. Returns `true` if the ledger changed.
    pub fn add(&mut self, id: impl Into<ProductId>, unit_price: Price, qty: u32) -> bool {
        let id = id.into();
        if qty == 0 {
            return false;
        }
        match self.position(&id) {
            Some(idx) => self.increment(idx, qty),
            None => self.items.push(LineItem::new(id, unit_price, qty)),
        }
        true
    }

    /// Same as [`Ledger::add`], carrying the product's name and metadata
    /// onto a newly created line.
    pub fn add_product(&mut self, product: &Product, qty: u32) -> bool {
        if qty == 0 {
            return false;
        }
        match self.position(&product.id) {
            Some(idx) => self.increment(idx, qty),
            None => self.items.push(LineItem::from_product(product, qty)),
        }
        true
    }

    /// Replace the quantity of an existing line.
    ///
    /// `new_qty <= 0` removes the line (absent ids included). A positive
    /// quantity for an id not in the cart is `ItemNotFound`.
    /// Returns `true` if the ledger changed.
    pub fn set_quantity(&mut self, id: &ProductId, new_qty: i64) -> Result<bool, CoreError> {
        if new_qty <= 0 {
            return Ok(self.remove(id));
        }
        let qty = u32::try_from(new_qty).map_err(|_| {
            CoreError::ValidationError(format!(
                "Quantity {new_qty} for item {id} exceeds the maximum of {}",
                u32::MAX
            ))
        })?;
        let idx = self
            .position(id)
            .ok_or_else(|| CoreError::ItemNotFound(id.clone()))?;

        let item = &mut self.items[idx];
        if item.quantity == qty {
            return Ok(false);
        }
        item.quantity = qty;
        Ok(true)
    }

    /// Remove a line. Removing an absent id is a no-op.
    /// Returns `true` if a line was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Empty the ledger.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Subtotal and item count, computed fresh from the lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.items
            .iter()
            .fold(CartTotals::default(), |acc, item| CartTotals {
                subtotal: acc.subtotal.saturating_add(item.line_total()),
                item_count: acc.item_count.saturating_add(u64::from(item.quantity)),
            })
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.position(id).is_some()
    }

    /// Number of distinct lines (not units; see [`CartTotals::item_count`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    fn increment(&mut self, idx: usize, qty: u32) {
        let item = &mut self.items[idx];
        item.quantity = item.quantity.saturating_add(qty);
    }
}
