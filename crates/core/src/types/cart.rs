//! Cart lines, totals, and coupons.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::Product;

/// Hard ceiling on any negotiated discount, in percent.
pub const MAX_DISCOUNT_PERCENT: u8 = 30;

/// One line in a shopping cart: a product snapshot plus the chosen variant.
///
/// Lines are unique per (product id, color, size); adding the same
/// combination again increments `quantity` instead of duplicating the line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Snapshot of the product at the time it was added.
    pub product: Product,
    /// Chosen color, or empty when the product has none.
    pub selected_color: String,
    /// Chosen size, or empty when the product has none.
    pub selected_size: String,
    /// Number of units, always >= 1.
    pub quantity: u32,
}

impl CartLine {
    /// Whether this line holds the same (product, color, size) combination.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.product.id == other.product.id
            && self.selected_color == other.selected_color
            && self.selected_size == other.selected_size
    }

    /// Price of the whole line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Cart totals after any coupon.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of all line totals.
    pub subtotal: Decimal,
    /// Amount taken off by the active coupon.
    pub discount: Decimal,
    /// Subtotal minus discount.
    pub total: Decimal,
}

/// A discount coupon.
///
/// The discount percent is clamped to `1..=MAX_DISCOUNT_PERCENT` at
/// construction. This is a business invariant, not a suggestion: no caller
/// (including the remote model) can produce a coupon outside that range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    code: String,
    discount_percent: u8,
}

impl Coupon {
    /// Create a coupon, clamping the requested percent into `1..=30`.
    #[must_use]
    pub fn new(code: impl Into<String>, requested_percent: i64) -> Self {
        let clamped = requested_percent.clamp(1, i64::from(MAX_DISCOUNT_PERCENT));
        Self {
            code: code.into(),
            // Within 1..=30 after the clamp above.
            discount_percent: u8::try_from(clamped).unwrap_or(MAX_DISCOUNT_PERCENT),
        }
    }

    /// Coupon code (e.g., "BDAY-20").
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Effective discount percent, always in `1..=30`.
    #[must_use]
    pub const fn discount_percent(&self) -> u8 {
        self.discount_percent
    }

    /// Apply this coupon to a subtotal.
    #[must_use]
    pub fn apply(&self, subtotal: Decimal) -> CartTotals {
        let discount = subtotal * Decimal::from(self.discount_percent) / Decimal::from(100);
        CartTotals {
            subtotal,
            discount,
            total: subtotal - discount,
        }
    }
}
