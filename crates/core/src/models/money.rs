use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CoreError;

/// A non-negative, currency-agnostic unit price, at most [`Price::MAX`].
///
/// Backed by `Decimal` so that cart arithmetic stays exact (`9.99 * 3`
/// is `29.97`, not `29.969999...`). Persisted as a plain JSON number,
/// which is what the storefront has always written to local storage:
/// whole amounts as integers (`25`), everything else as floats (`9.99`).
///
/// The ceiling keeps `price × u32::MAX` and any realistic cart subtotal
/// well inside `Decimal`'s range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// One billion per unit.
    pub const MAX: Price = Price(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

    /// Create a price, rejecting negative amounts and amounts above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, CoreError> {
        if amount < Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "Price must not be negative (got {amount})"
            )));
        }
        if amount > Self::MAX.0 {
            return Err(CoreError::ValidationError(format!(
                "Price must not exceed {} (got {amount})",
                Self::MAX.0
            )));
        }
        Ok(Self(amount.normalize()))
    }

    /// Create a price from an integer number of cents.
    pub fn from_cents(cents: u64) -> Result<Self, CoreError> {
        Self::new(Decimal::from(cents) / Decimal::ONE_HUNDRED)
    }

    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0.saturating_mul(Decimal::from(quantity))
    }

    /// Whole-percent markdown from `original` to this price, rounded half up.
    /// Zero when `original` is not above this price.
    #[must_use]
    pub fn percent_off(&self, original: Price) -> u8 {
        if original.0 <= self.0 {
            return 0;
        }
        ((original.0 - self.0) / original.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u8()
            .unwrap_or(0)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = CoreError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.fract().is_zero().then(|| self.0.to_u64()).flatten() {
            Some(whole) => serializer.serialize_u64(whole),
            None => rust_decimal::serde::float::serialize(&self.0, serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accepts numbers and numeric strings.
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Price::new(amount).map_err(serde::de::Error::custom)
    }
}
