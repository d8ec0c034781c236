use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A promo code that matched the discount table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPromo {
    /// Canonical (upper-case) code
    pub code: String,
    /// Whole-number percentage taken off the subtotal
    pub percent: u8,
}

/// Everything the checkout panel shows, derived from the cart in one place.
///
/// `total = subtotal - discount_amount + shipping`, never below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    pub item_count: u64,
    pub discount_percent: u8,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl CheckoutSummary {
    /// Whether the order qualified for free shipping.
    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }
}
