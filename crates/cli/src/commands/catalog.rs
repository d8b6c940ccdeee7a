//! Catalog listing.

use stylevault_core::Catalog;

/// Print the full catalog, one product per line.
pub fn run(catalog: &Catalog) {
    for p in catalog.products() {
        let stock = if p.in_stock { "" } else { "  [OUT OF STOCK]" };
        println!(
            "[{}] {} — ${} ({} / {}) ⭐{} ({} reviews){stock}",
            p.id, p.name, p.price, p.category, p.subcategory, p.rating, p.reviews
        );
    }
    println!("\n{} products, {} in stock", catalog.len(), catalog.in_stock().count());
}
