use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::money::Price;

/// Stable product key.
///
/// Catalog entries use numeric ids; string ids are accepted too. The
/// representation is kept as-is when persisted so snapshots round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Numeric(u64),
    Text(String),
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductId::Numeric(n) => write!(f, "{n}"),
            ProductId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId::Numeric(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId::Text(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        ProductId::Text(id)
    }
}

/// A product as presented by a listing page, ready to be put in the cart.
///
/// Only `id` and `price` take part in cart arithmetic. Everything else a
/// listing carries (image, category, rating, stock, ...) rides along in
/// `metadata` and is copied onto the cart line untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            metadata: Map::new(),
        }
    }

    /// Attach an opaque descriptive field (builder style).
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    // ── Listing fields ──────────────────────────────────────────────

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.metadata.get("description").and_then(Value::as_str)
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.metadata.get("category").and_then(Value::as_str)
    }

    #[must_use]
    pub fn brand(&self) -> Option<&str> {
        self.metadata.get("brand").and_then(Value::as_str)
    }

    /// Average review score; unrated listings have none.
    #[must_use]
    pub fn rating(&self) -> Option<f64> {
        self.metadata.get("rating").and_then(Value::as_f64)
    }

    /// Pre-sale price, if the listing is marked down.
    #[must_use]
    pub fn original_price(&self) -> Option<Price> {
        original_price(&self.metadata)
    }

    /// Whole-percent markdown from `originalPrice`, or 0 when not on sale.
    #[must_use]
    pub fn sale_percent(&self) -> u8 {
        self.original_price()
            .map_or(0, |original| self.price.percent_off(original))
    }
}

/// `originalPrice` from listing metadata. `null`, negative or non-numeric
/// values count as absent.
pub(crate) fn original_price(metadata: &Map<String, Value>) -> Option<Price> {
    metadata
        .get("originalPrice")
        .filter(|v| !v.is_null())
        .and_then(|v| Price::deserialize(v).ok())
}
