//! Catalog search without the model.

use stylevault_clerk::search::semantic_search;
use stylevault_core::Catalog;

/// Print the top matches for a query.
pub fn run(catalog: &Catalog, query: &str, limit: usize) {
    let hits = semantic_search(query, catalog, limit);
    if hits.is_empty() {
        println!("No matches for \"{query}\".");
        return;
    }
    println!("{:<4} {:<6} {:<30} {:>9}  {}", "ID", "SCORE", "NAME", "PRICE", "CATEGORY");
    for hit in hits {
        let p = hit.product;
        println!(
            "{:<4} {:<6} {:<30} {:>9}  {}",
            p.id,
            hit.score,
            p.name,
            format!("${}", p.price),
            p.category
        );
    }
}
