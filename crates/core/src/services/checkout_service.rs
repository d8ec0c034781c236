use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::CoreError;
use crate::models::cart::CartTotals;
use crate::models::checkout::{AppliedPromo, CheckoutSummary};
use crate::models::settings::CheckoutPolicy;

/// Derives shipping, discount and the order total from cart totals.
///
/// Pure business logic, no I/O.
#[derive(Debug, Clone, Default)]
pub struct CheckoutService {
    policy: CheckoutPolicy,
}

impl CheckoutService {
    pub fn new(policy: CheckoutPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &CheckoutPolicy {
        &self.policy
    }

    /// Look up a promo code (case-insensitive).
    pub fn apply_promo(&self, code: &str) -> Result<AppliedPromo, CoreError> {
        self.policy
            .percent_for(code)
            .map(|(canonical, percent)| AppliedPromo {
                code: canonical.to_string(),
                percent,
            })
            .ok_or_else(|| CoreError::InvalidPromoCode(code.trim().to_string()))
    }

    /// Discount percentage for a promo code.
    pub fn resolve_promo(&self, code: &str) -> Result<u8, CoreError> {
        self.apply_promo(code).map(|promo| promo.percent)
    }

    /// Free above the threshold (exclusive), flat fee otherwise.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.policy.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.policy.flat_shipping_fee
        }
    }

    /// `subtotal × percent / 100`, rounded to cents. Never exceeds `subtotal`.
    #[must_use]
    pub fn discount_for(&self, subtotal: Decimal, percent: u8) -> Decimal {
        let rate = Decimal::from(percent.min(100)) / Decimal::ONE_HUNDRED;
        (subtotal * rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Full checkout breakdown for the given cart totals.
    #[must_use]
    pub fn summarize(&self, totals: CartTotals, discount_percent: u8) -> CheckoutSummary {
        let discount_percent = discount_percent.min(100);
        let subtotal = totals.subtotal;
        let discount_amount = self.discount_for(subtotal, discount_percent);
        let shipping = self.shipping_for(subtotal);
        let total = (subtotal - discount_amount)
            .saturating_add(shipping)
            .max(Decimal::ZERO);

        CheckoutSummary {
            subtotal,
            item_count: totals.item_count,
            discount_percent,
            discount_amount,
            shipping,
            total,
        }
    }
}
