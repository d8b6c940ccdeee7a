//! Token-based semantic product search.
//!
//! Scores catalog products against a free-text query using direct token
//! overlap plus a fixed concept-expansion map (occasions, seasons,
//! descriptors, item types). No network, no index build: the catalog is
//! small and static, so every search is a full scan with stable ordering.

pub mod matcher;
pub mod resolver;

use stylevault_core::{Catalog, Product};

use crate::actions::ActivityEntry;

/// Concept expansion map: query token -> related product attributes.
///
/// Lets "wedding" surface blazers and silk, "gym" surface leggings, etc.
/// Expanded tokens score at roughly a quarter of their direct counterparts.
const CONCEPT_MAP: &[(&str, &[&str])] = &[
    // Occasions
    (
        "wedding",
        &["formal", "elegant", "dress", "blazer", "suit", "clutch", "silk", "linen", "loafers"],
    ),
    ("party", &["dress", "clutch", "evening", "elegant", "jewelry", "necklace"]),
    ("beach", &["summer", "sunglasses", "hat", "linen", "sandals", "speaker", "outdoor"]),
    ("vacation", &["travel", "beach", "summer", "hat", "sunglasses", "linen", "backpack"]),
    (
        "gym",
        &["fitness", "sports", "activewear", "leggings", "sneakers", "tracker", "running"],
    ),
    ("workout", &["fitness", "sports", "activewear", "leggings", "sneakers", "running"]),
    ("office", &["formal", "tailored", "blazer", "trousers", "shirt", "watch", "bag"]),
    ("date", &["elegant", "dress", "jewelry", "necklace", "clutch", "watch"]),
    ("gift", &["watch", "wallet", "necklace", "scarf", "headphones", "speaker"]),
    // Seasons
    ("summer", &["light", "breathable", "linen", "sunglasses", "hat", "beach", "floral"]),
    ("winter", &["warm", "wool", "cashmere", "scarf", "sweater", "jacket", "layering"]),
    ("spring", &["light", "floral", "dress", "sneakers", "jacket"]),
    ("fall", &["layering", "jacket", "sweater", "boots", "scarf", "denim"]),
    // Descriptors
    ("cheap", &["budget", "affordable"]),
    ("expensive", &["luxury", "premium", "cashmere", "leather", "silk", "italian"]),
    ("fancy", &["elegant", "formal", "silk", "luxury", "jewelry"]),
    ("casual", &["everyday", "comfortable", "basic", "denim", "sneakers", "t-shirt"]),
    ("sporty", &["sports", "athletic", "fitness", "running", "activewear"]),
    ("minimalist", &["minimal", "clean", "simple", "basic"]),
    ("trendy", &["streetwear", "modern", "fashion"]),
    ("comfortable", &["soft", "relaxed", "stretch", "cushioned"]),
    // Item types (natural language -> tags)
    ("clothes", &["clothing"]),
    ("outfit", &["clothing", "dress", "blazer", "shirt", "pants"]),
    ("shoes", &["sneakers", "loafers", "footwear"]),
    ("tech", &["electronics", "headphones", "speaker", "tracker"]),
    ("bags", &["bag", "backpack", "clutch", "crossbody"]),
    ("jewellery", &["jewelry", "necklace", "ring", "bracelet"]),
    ("jewelry", &["necklace", "ring", "bracelet", "pendant"]),
];

/// Inclusion floor: products scoring at or below this are dropped.
const MIN_SCORE: u32 = 5;

/// Scores are capped here.
const MAX_SCORE: u32 = 100;

/// A search result: a catalog product and its relevance score (0-100).
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    /// The matched product.
    pub product: &'a Product,
    /// Relevance score, higher is better.
    pub score: u32,
}

/// Tokenize and normalize text: lowercase, strip punctuation, drop
/// single-character tokens.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|w| w.len() > 1)
        .map(ToString::to_string)
        .collect()
}

/// Expand query tokens through the concept map.
///
/// Returns the original tokens followed by any expansions, deduplicated in
/// insertion order so output stays deterministic.
#[must_use]
pub fn expand_query(tokens: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = tokens.to_vec();
    let mut push = |expanded: &mut Vec<String>, value: &str| {
        if !expanded.iter().any(|t| t == value) {
            expanded.push(value.to_string());
        }
    };
    for token in tokens {
        for (key, values) in CONCEPT_MAP {
            // Exact key hit, or partial overlap either direction.
            if *key == token || key.contains(token.as_str()) || token.contains(key) {
                for value in *values {
                    push(&mut expanded, value);
                }
                push(&mut expanded, key);
            }
        }
    }
    expanded
}

fn any_overlap(tokens: &[String], query_token: &str) -> bool {
    tokens
        .iter()
        .any(|t| t.contains(query_token) || query_token.contains(t.as_str()))
}

/// Score a product against a query (0-100).
fn score_product(product: &Product, query_tokens: &[String], expanded_tokens: &[String]) -> u32 {
    let name_tokens = tokenize(&product.name);
    let desc_tokens = tokenize(&product.description);
    let tag_tokens: Vec<String> = product.tags.iter().map(|t| t.to_lowercase()).collect();
    let category_tokens = tokenize(&format!("{} {}", product.category, product.subcategory));
    let color_tokens: Vec<String> = product.colors.iter().map(|c| c.to_lowercase()).collect();

    let mut score = 0u32;

    for qt in query_tokens {
        // Direct name match (highest weight)
        if any_overlap(&name_tokens, qt) {
            score += 25;
        }
        // Direct tag match
        if any_overlap(&tag_tokens, qt) {
            score += 15;
        }
        // Category match
        if any_overlap(&category_tokens, qt) {
            score += 15;
        }
        // Description match
        if any_overlap(&desc_tokens, qt) {
            score += 8;
        }
        // Color match
        if any_overlap(&color_tokens, qt) {
            score += 10;
        }
    }

    // Expanded semantic matches score lower: they are inferred, not stated.
    for st in expanded_tokens.iter().filter(|t| !query_tokens.contains(t)) {
        if tag_tokens.iter().any(|t| t == st) {
            score += 6;
        }
        if name_tokens.iter().any(|nt| nt.contains(st.as_str())) {
            score += 4;
        }
        if category_tokens.iter().any(|ct| ct.contains(st.as_str())) {
            score += 4;
        }
        if desc_tokens.iter().any(|dt| dt.contains(st.as_str())) {
            score += 2;
        }
    }

    score.min(MAX_SCORE)
}

/// Find products matching a natural-language query, best first.
///
/// Ties keep catalog order, so identical inputs always produce identical
/// output.
#[must_use]
pub fn semantic_search<'a>(query: &str, catalog: &'a Catalog, limit: usize) -> Vec<SearchHit<'a>> {
    let query_tokens = tokenize(query);
    let expanded_tokens = expand_query(&query_tokens);

    let mut hits: Vec<SearchHit<'a>> = catalog
        .products()
        .iter()
        .map(|product| SearchHit {
            product,
            score: score_product(product, &query_tokens, &expanded_tokens),
        })
        .filter(|hit| hit.score > MIN_SCORE)
        .collect();

    // Stable sort: equal scores keep catalog order.
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits.truncate(limit);
    hits
}

/// Whether a product comes in a color (case-insensitive substring).
#[must_use]
pub fn color_available(product: &Product, color: &str) -> bool {
    let wanted = color.to_lowercase();
    product
        .colors
        .iter()
        .any(|c| c.to_lowercase().contains(&wanted))
}

/// Whether a product comes in a size (case-insensitive equality).
#[must_use]
pub fn size_available(product: &Product, size: &str) -> bool {
    product.sizes.iter().any(|s| s.eq_ignore_ascii_case(size))
}

/// Requested color matched by substring, else the product default.
///
/// "navy" selects "Navy Blue"; an unknown color falls back rather than
/// failing the add.
#[must_use]
pub fn pick_color(product: &Product, requested: Option<&str>) -> String {
    requested
        .and_then(|want| {
            let want = want.to_lowercase();
            product
                .colors
                .iter()
                .find(|c| c.to_lowercase().contains(&want))
        })
        .map_or_else(
            || product.default_color().unwrap_or_default().to_string(),
            Clone::clone,
        )
}

/// Requested size matched exactly (case-insensitive), else the default.
#[must_use]
pub fn pick_size(product: &Product, requested: Option<&str>) -> String {
    requested
        .and_then(|want| product.sizes.iter().find(|s| s.eq_ignore_ascii_case(want)))
        .map_or_else(
            || product.default_size().unwrap_or_default().to_string(),
            Clone::clone,
        )
}

/// Personalized recommendations from recent activity.
///
/// With no activity, returns the top-rated products. Otherwise scores
/// products the user has not touched by category frequency (x3) plus tag
/// frequency (x2) plus rating, over the 20 most recent entries.
#[must_use]
pub fn recommendations<'a>(
    activity: &[ActivityEntry],
    catalog: &'a Catalog,
    limit: usize,
) -> Vec<&'a Product> {
    if activity.is_empty() {
        let mut by_rating: Vec<&Product> = catalog.products().iter().collect();
        by_rating.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        by_rating.truncate(limit);
        return by_rating;
    }

    let recent = activity.iter().take(20).collect::<Vec<_>>();
    let seen: Vec<_> = recent.iter().map(|e| e.product_id).collect();

    let category_freq = |category: &str| -> f64 {
        let n = recent.iter().filter(|e| e.category == category).count();
        n as f64
    };
    let tag_freq = |tag: &str| -> f64 {
        let n = recent
            .iter()
            .flat_map(|e| e.tags.iter())
            .filter(|t| t.as_str() == tag)
            .count();
        n as f64
    };

    let mut scored: Vec<(&Product, f64)> = catalog
        .products()
        .iter()
        .filter(|p| !seen.contains(&p.id))
        .map(|p| {
            let mut score = category_freq(&p.category) * 3.0;
            for tag in &p.tags {
                score += tag_freq(tag) * 2.0;
            }
            score += f64::from(p.rating);
            (p, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().take(limit).map(|(p, _)| p).collect()
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::catalog;
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation_and_short_tokens() {
        assert_eq!(tokenize("A blazer, please!"), vec!["blazer", "please"]);
        assert_eq!(tokenize("I'd"), Vec::<String>::new());
    }

    #[test]
    fn test_expand_query_adds_concepts() {
        let tokens = tokenize("wedding outfit");
        let expanded = expand_query(&tokens);
        assert!(expanded.iter().any(|t| t == "blazer"));
        assert!(expanded.iter().any(|t| t == "silk"));
        // Original tokens come first.
        assert_eq!(expanded.first().map(String::as_str), Some("wedding"));
    }

    #[test]
    fn test_search_finds_name_match_first() {
        let catalog = catalog();
        let hits = semantic_search("linen blazer", &catalog, 6);
        assert_eq!(
            hits.first().map(|h| h.product.name.as_str()),
            Some("Classic Linen Blazer")
        );
    }

    #[test]
    fn test_search_is_deterministic() {
        let catalog = catalog();
        let a: Vec<i32> = semantic_search("formal", &catalog, 6)
            .iter()
            .map(|h| h.product.id.as_i32())
            .collect();
        let b: Vec<i32> = semantic_search("formal", &catalog, 6)
            .iter()
            .map(|h| h.product.id.as_i32())
            .collect();
        assert_eq!(a, b);
        // Both products are tagged "formal"; catalog order breaks the tie.
        assert!(!a.is_empty());
    }

    #[test]
    fn test_search_drops_low_scores() {
        let catalog = catalog();
        let hits = semantic_search("spaceship", &catalog, 6);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_concept_expansion_reaches_tags() {
        let catalog = catalog();
        // "wedding" never appears in the catalog; the expansion to
        // formal/blazer/linen should still surface the blazer.
        let hits = semantic_search("wedding", &catalog, 6);
        assert!(
            hits.iter()
                .any(|h| h.product.name == "Classic Linen Blazer")
        );
    }

    #[test]
    fn test_color_and_size_availability() {
        let catalog = catalog();
        let blazer = catalog.products().first().expect("fixture");
        assert!(color_available(blazer, "black"));
        assert!(!color_available(blazer, "chartreuse"));
        assert!(size_available(blazer, "m"));
        assert!(!size_available(blazer, "XXL"));
    }

    #[test]
    fn test_recommendations_without_activity_are_top_rated() {
        let catalog = catalog();
        let recs = recommendations(&[], &catalog, 2);
        assert_eq!(
            recs.first().map(|p| p.name.as_str()),
            Some("Leather Loafers")
        );
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn test_recommendations_skip_seen_products() {
        let catalog = catalog();
        let blazer = catalog.products().first().expect("fixture");
        let activity = vec![crate::actions::ActivityEntry {
            product_id: blazer.id,
            category: blazer.category.clone(),
            tags: blazer.tags.clone(),
        }];
        let recs = recommendations(&activity, &catalog, 4);
        assert!(recs.iter().all(|p| p.id != blazer.id));
    }
}
