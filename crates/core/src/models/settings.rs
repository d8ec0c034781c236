use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::errors::CoreError;

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(CoreError::ValidationError(format!("Unknown theme '{other}'"))),
        }
    }
}

/// Shipping and discount rules applied at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutPolicy {
    /// Orders with a subtotal strictly above this ship free.
    #[serde(with = "rust_decimal::serde::float")]
    pub free_shipping_threshold: Decimal,

    /// Charged when the subtotal does not clear the threshold.
    #[serde(with = "rust_decimal::serde::float")]
    pub flat_shipping_fee: Decimal,

    /// Promo code → percentage off. Lookup ignores case.
    pub promo_codes: BTreeMap<String, u8>,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        let promo_codes = [("SAVE10", 10), ("WELCOME20", 20), ("SUMMER15", 15)]
            .into_iter()
            .map(|(code, pct)| (code.to_string(), pct))
            .collect();
        Self {
            free_shipping_threshold: Decimal::new(50, 0),
            flat_shipping_fee: Decimal::new(599, 2),
            promo_codes,
        }
    }
}

impl CheckoutPolicy {
    /// Percentage for `code`, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn percent_for(&self, code: &str) -> Option<(&str, u8)> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.promo_codes
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(code))
            .map(|(known, pct)| (known.as_str(), *pct))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.free_shipping_threshold < Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "Free-shipping threshold must not be negative (got {})",
                self.free_shipping_threshold
            )));
        }
        if self.flat_shipping_fee < Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "Shipping fee must not be negative (got {})",
                self.flat_shipping_fee
            )));
        }
        if let Some((code, pct)) = self.promo_codes.iter().find(|(_, pct)| **pct > 100) {
            return Err(CoreError::ValidationError(format!(
                "Promo code '{code}' discounts {pct}%, above 100%"
            )));
        }
        if let Some(code) = self.promo_codes.keys().find(|c| c.trim().is_empty()) {
            return Err(CoreError::ValidationError(format!(
                "Promo code '{code}' is blank"
            )));
        }
        Ok(())
    }
}

/// Storage keys for each piece of persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub cart: String,
    pub wishlist: String,
    pub theme: String,
    pub user: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            cart: "cart".to_string(),
            wishlist: "wishlist".to_string(),
            theme: "theme".to_string(),
            user: "user".to_string(),
        }
    }
}

impl StorageKeys {
    fn validate(&self) -> Result<(), CoreError> {
        let keys = [&self.cart, &self.wishlist, &self.theme, &self.user];
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(CoreError::ValidationError("Storage keys must not be blank".into()));
        }
        for (i, a) in keys.iter().enumerate() {
            if keys[i + 1..].contains(a) {
                return Err(CoreError::ValidationError(format!(
                    "Storage key '{a}' is used for more than one kind of state"
                )));
            }
        }
        Ok(())
    }
}

/// Storefront configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub checkout: CheckoutPolicy,
    pub keys: StorageKeys,
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.checkout.validate()?;
        self.keys.validate()
    }
}
