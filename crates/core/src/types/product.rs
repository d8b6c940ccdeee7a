//! Products and the read-only catalog index.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A purchasable product.
///
/// Products are immutable for the duration of a session and owned by the
/// [`Catalog`]. Prices use decimal arithmetic; never floats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Stable unique identifier. Higher IDs are newer catalog entries.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Top-level category (e.g., "Clothing", "Shoes").
    pub category: String,
    /// Finer-grained grouping within the category.
    pub subcategory: String,
    /// Current selling price.
    pub price: Decimal,
    /// Price before any markdown.
    pub original_price: Decimal,
    /// Percent off the original price.
    pub discount: u8,
    /// Average review rating, 0.0 to 5.0.
    pub rating: f32,
    /// Number of reviews behind the rating.
    pub reviews: u32,
    /// Available colors, in display order. May be empty.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Available sizes, in display order. May be empty.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Free-form search tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Marketing description.
    pub description: String,
    /// Whether the product can currently be purchased.
    pub in_stock: bool,
}

impl Product {
    /// Markdown amount in currency units (original price minus price).
    #[must_use]
    pub fn savings(&self) -> Decimal {
        self.original_price - self.price
    }

    /// Default color: the first listed, if any.
    #[must_use]
    pub fn default_color(&self) -> Option<&str> {
        self.colors.first().map(String::as_str)
    }

    /// Default size: the first listed, if any.
    #[must_use]
    pub fn default_size(&self) -> Option<&str> {
        self.sizes.first().map(String::as_str)
    }
}

/// The static, read-only set of purchasable products for a session.
///
/// Owns the product list and provides lookups. Catalog order is stable and
/// meaningful: scoring ties are broken by it, and IDs act as a recency proxy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create a catalog from a product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// All products, in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Iterate over in-stock products, in catalog order.
    pub fn in_stock(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.in_stock)
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Flatten the catalog into compact text for a model prompt.
    ///
    /// One line per product:
    /// `[ID:1] Classic Linen Blazer — $89.99 (Clothing) colors:Navy Blue/Beige sizes:S/M/L`
    #[must_use]
    pub fn compact_text(&self) -> String {
        self.products
            .iter()
            .map(|p| {
                format!(
                    "[ID:{}] {} — ${} ({}) colors:{} sizes:{}",
                    p.id,
                    p.name,
                    p.price,
                    p.category,
                    p.colors.join("/"),
                    p.sizes.join("/"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
