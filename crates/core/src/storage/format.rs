use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::cart::{Ledger, LineItem};
use crate::models::product::ProductId;
use crate::models::settings::Theme;
use crate::models::user::User;
use crate::models::wishlist::Wishlist;

/// Cart snapshot as written to storage.
///
/// Layout:
/// ```text
/// { "items": [ { "id": 1, "name": "...", "price": 9.99, "quantity": 3, ...opaque }, ... ] }
/// ```
/// Totals are never written; they are recomputed from `items`.
#[derive(Debug, Serialize)]
pub struct CartSnapshot<'a> {
    pub items: &'a [LineItem],
}

/// Every cart shape found in existing storage.
///
/// Older sessions wrote `{ items, total }` (the stale `total` is ignored)
/// and the standalone cart page wrote a bare array of lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredCart {
    Object { items: Vec<LineItem> },
    Bare(Vec<LineItem>),
}

impl StoredCart {
    fn into_items(self) -> Vec<LineItem> {
        match self {
            StoredCart::Object { items } | StoredCart::Bare(items) => items,
        }
    }
}

// ── Cart ────────────────────────────────────────────────────────────

pub fn encode_cart(ledger: &Ledger) -> Result<String, CoreError> {
    let snapshot = CartSnapshot {
        items: ledger.items(),
    };
    serde_json::to_string(&snapshot)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize cart: {e}")))
}

pub fn decode_cart(raw: &str) -> Result<Ledger, CoreError> {
    let stored: StoredCart = serde_json::from_str(raw)
        .map_err(|e| CoreError::Deserialization(format!("Failed to parse cart: {e}")))?;
    Ok(Ledger::from_items(stored.into_items()))
}

// ── Wishlist ────────────────────────────────────────────────────────

/// Wishlist is stored as a bare JSON array of product ids.
pub fn encode_wishlist(wishlist: &Wishlist) -> Result<String, CoreError> {
    serde_json::to_string(wishlist)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize wishlist: {e}")))
}

pub fn decode_wishlist(raw: &str) -> Result<Wishlist, CoreError> {
    let ids: Vec<ProductId> = serde_json::from_str(raw)
        .map_err(|e| CoreError::Deserialization(format!("Failed to parse wishlist: {e}")))?;
    Ok(Wishlist::from_ids(ids))
}

// ── Theme ───────────────────────────────────────────────────────────

/// Theme is stored as the bare word `light` or `dark`, not as JSON.
#[must_use]
pub fn encode_theme(theme: Theme) -> String {
    theme.as_str().to_string()
}

pub fn decode_theme(raw: &str) -> Result<Theme, CoreError> {
    // Tolerate a JSON-quoted value ("\"dark\"") as well as the bare word.
    raw.trim().trim_matches('"').parse()
}

// ── User ────────────────────────────────────────────────────────────

pub fn encode_user(user: &User) -> Result<String, CoreError> {
    serde_json::to_string(user)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize user: {e}")))
}

pub fn decode_user(raw: &str) -> Result<User, CoreError> {
    let user: User = serde_json::from_str(raw)
        .map_err(|e| CoreError::Deserialization(format!("Failed to parse user: {e}")))?;
    user.validate()?;
    Ok(user)
}
