//! The store-action capability seam and the action log.
//!
//! The engine never owns cart or navigation state. Every side effect goes
//! through [`StoreActions`], one method per capability, so callers can plug
//! in real UI state or a recording test double. [`MemoryCart`] is the
//! reference implementation used by the CLI and by tests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stylevault_core::{CartLine, CartTotals, Coupon, Product, ProductId};

/// Maximum number of activity entries retained by [`MemoryCart`].
const ACTIVITY_CAP: usize = 50;

/// One entry in the browsing/cart activity log, used for recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Product the user interacted with.
    pub product_id: ProductId,
    /// Its category at the time.
    pub category: String,
    /// Its tags at the time.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An immutable log entry for one executed tool, local or remote.
///
/// Appended exactly once per execution, whether or not it succeeded. Feeds
/// both the caller's UI and the hallucination guard.
#[derive(Debug, Clone, Serialize)]
pub struct ActionRecord {
    /// Tool name (e.g., "add_to_cart").
    pub function: String,
    /// Resolved arguments the tool ran with.
    pub args: serde_json::Value,
    /// Structured result, including `success:false` failures.
    pub result: serde_json::Value,
    /// When the tool executed.
    pub executed_at: DateTime<Utc>,
}

impl ActionRecord {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(function: &str, args: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            function: function.to_string(),
            args,
            result,
            executed_at: Utc::now(),
        }
    }
}

/// Capability set the engine calls into for every side effect.
///
/// Implementations own all mutable store state. Each method is a single
/// atomic operation; the engine never holds a multi-step transaction open
/// across a network suspension point.
pub trait StoreActions {
    /// Add a product to the cart, merging on (product, color, size).
    fn add_to_cart(&mut self, product: &Product, color: &str, size: &str, quantity: u32);
    /// Remove the cart line at `index`.
    fn remove_from_cart(&mut self, index: usize);
    /// Empty the cart and drop any coupon.
    fn clear_cart(&mut self);
    /// Snapshot of current cart lines.
    fn cart_items(&self) -> Vec<CartLine>;
    /// Current totals after any coupon.
    fn cart_totals(&self) -> CartTotals;
    /// Apply a (already clamped) coupon.
    fn apply_coupon(&mut self, coupon: Coupon);
    /// Change the product listing sort order.
    fn set_sort_by(&mut self, sort: &str);
    /// Change the selected category filter.
    fn set_selected_category(&mut self, category: &str);
    /// Change the free-text search filter.
    fn set_search_query(&mut self, query: &str);
    /// Highlight specific products in the listing.
    fn set_highlighted_products(&mut self, ids: &[ProductId]);
    /// Navigate the UI to a path.
    fn navigate_to(&mut self, path: &str);
    /// Recent browsing/cart activity, newest first.
    fn activity(&self) -> Vec<ActivityEntry>;
}

/// In-memory reference implementation of [`StoreActions`].
///
/// Mirrors the storefront cart semantics: adds merge on (product id, color,
/// size) by incrementing quantity, removal is by index, clearing resets the
/// coupon too. Also records the filter/navigation state so callers can
/// inspect what the engine did.
#[derive(Debug, Default)]
pub struct MemoryCart {
    items: Vec<CartLine>,
    coupon: Option<Coupon>,
    activity: Vec<ActivityEntry>,
    /// Last navigation target, if any.
    pub current_path: Option<String>,
    /// Active sort order, if set.
    pub sort_by: Option<String>,
    /// Active category filter, if set.
    pub selected_category: Option<String>,
    /// Active search filter, if set.
    pub search_query: Option<String>,
    /// Currently highlighted products.
    pub highlighted: Vec<ProductId>,
}

impl MemoryCart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active coupon, if any.
    #[must_use]
    pub const fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }
}

impl StoreActions for MemoryCart {
    fn add_to_cart(&mut self, product: &Product, color: &str, size: &str, quantity: u32) {
        let quantity = quantity.max(1);
        let line = CartLine {
            product: product.clone(),
            selected_color: color.to_string(),
            selected_size: size.to_string(),
            quantity,
        };
        if let Some(existing) = self.items.iter_mut().find(|l| l.matches(&line)) {
            existing.quantity += quantity;
        } else {
            self.items.push(line);
        }
        self.activity.insert(
            0,
            ActivityEntry {
                product_id: product.id,
                category: product.category.clone(),
                tags: product.tags.clone(),
            },
        );
        self.activity.truncate(ACTIVITY_CAP);
    }

    fn remove_from_cart(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    fn clear_cart(&mut self) {
        self.items.clear();
        self.coupon = None;
    }

    fn cart_items(&self) -> Vec<CartLine> {
        self.items.clone()
    }

    fn cart_totals(&self) -> CartTotals {
        let subtotal: Decimal = self.items.iter().map(CartLine::line_total).sum();
        self.coupon.as_ref().map_or(
            CartTotals {
                subtotal,
                discount: Decimal::ZERO,
                total: subtotal,
            },
            |c| c.apply(subtotal),
        )
    }

    fn apply_coupon(&mut self, coupon: Coupon) {
        self.coupon = Some(coupon);
    }

    fn set_sort_by(&mut self, sort: &str) {
        self.sort_by = Some(sort.to_string());
    }

    fn set_selected_category(&mut self, category: &str) {
        self.selected_category = Some(category.to_string());
    }

    fn set_search_query(&mut self, query: &str) {
        self.search_query = Some(query.to_string());
    }

    fn set_highlighted_products(&mut self, ids: &[ProductId]) {
        self.highlighted = ids.to_vec();
    }

    fn navigate_to(&mut self, path: &str) {
        self.current_path = Some(path.to_string());
    }

    fn activity(&self) -> Vec<ActivityEntry> {
        self.activity.clone()
    }
}
