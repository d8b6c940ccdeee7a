//! Single-product name resolution.
//!
//! Resolves a free-text phrase ("the blazer", "leather loafers") to the one
//! best-matching catalog product, or `None`. Callers must treat `None` as
//! "defer to the remote model" or "report not found", never as a silent
//! no-op.

use std::collections::HashSet;
use std::sync::LazyLock;

use stylevault_core::{Catalog, Product};

use super::semantic_search;

/// Semantic-fallback acceptance threshold. Stricter than the general
/// search's inclusion floor so a tangential hit is never treated as a
/// confident single-product resolution.
const FALLBACK_MIN_SCORE: u32 = 25;

/// Minimum token-overlap score to accept a stage-3 match.
const OVERLAP_MIN_SCORE: u32 = 8;

/// Words ignored during name matching: generic nouns, fillers, and
/// comparative qualifiers. Qualifiers are excluded here deliberately; they
/// belong to the superlative resolver, not the matcher.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "item",
        "items",
        "product",
        "products",
        "thing",
        "things",
        "stuff",
        "one",
        "ones",
        "something",
        "anything",
        "everything",
        "the",
        "this",
        "that",
        "those",
        "these",
        "from",
        "for",
        "with",
        "and",
        "but",
        "not",
        "please",
        "just",
        "some",
        "any",
        "all",
        "my",
        "your",
        "our",
        "cart",
        "store",
        "shop",
        "most",
        "least",
        "very",
        "really",
        "super",
        "cheapest",
        "expensive",
        "cheap",
        "pricey",
        "best",
        "worst",
        "good",
        "great",
        "nice",
        "rated",
        "popular",
        "newest",
        "latest",
        "oldest",
        "price",
        "priced",
        "quality",
    ]
    .into_iter()
    .collect()
});

/// Resolve a phrase to the single best-matching product.
///
/// Stages, in strict precedence order:
/// 1. exact case-insensitive name equality;
/// 2. substring containment either direction;
/// 3. token-overlap scoring (+10 per name-token hit, +2 tag, +3
///    category/subcategory) requiring at least one name hit and a minimum
///    total, so a tag-only coincidence never wins;
/// 4. semantic search restricted to the top result, accepted only above a
///    stricter threshold.
#[must_use]
pub fn find_product_by_name<'a>(query: &str, catalog: &'a Catalog) -> Option<&'a Product> {
    let q = query.to_lowercase();
    let q = q.trim();
    if q.is_empty() {
        return None;
    }

    // 1. Exact name match
    if let Some(exact) = catalog
        .products()
        .iter()
        .find(|p| p.name.to_lowercase() == q)
    {
        return Some(exact);
    }

    // 2. Name contains query or query contains name
    if let Some(partial) = catalog.products().iter().find(|p| {
        let name = p.name.to_lowercase();
        name.contains(q) || q.contains(&name)
    }) {
        return Some(partial);
    }

    // 3. Word-level overlap, ignoring stop words and short tokens
    let q_words: Vec<&str> = q
        .split_whitespace()
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(w))
        .collect();
    if q_words.is_empty() {
        // Every word was a stop word; nothing to match on.
        return None;
    }

    let mut best: Option<&Product> = None;
    let mut best_score = 0u32;
    let mut best_name_hits = 0u32;

    for p in catalog.products() {
        let name = p.name.to_lowercase();
        let name_words: Vec<&str> = name.split_whitespace().collect();
        let category = p.category.to_lowercase();
        let subcategory = p.subcategory.to_lowercase();

        let mut score = 0u32;
        let mut name_hits = 0u32;

        for qw in &q_words {
            for nw in &name_words {
                if nw.contains(qw) || qw.contains(nw) {
                    score += 10;
                    name_hits += 1;
                }
            }
            // Secondary signals carry lower weight and are never enough on
            // their own to trigger a match.
            if p.tags.iter().any(|t| t.to_lowercase().contains(qw)) {
                score += 2;
            }
            if category.contains(qw) {
                score += 3;
            }
            if subcategory.contains(qw) {
                score += 3;
            }
        }

        if score > best_score {
            best_score = score;
            best = Some(p);
            best_name_hits = name_hits;
        }
    }

    // A name-token hit is required: tags/category alone must not resolve,
    // or "laptop" would match a backpack tagged "laptop".
    if best_name_hits >= 1 && best_score >= OVERLAP_MIN_SCORE {
        return best;
    }

    // 4. Semantic fallback, top result only, stricter threshold
    semantic_search(query, catalog, 1)
        .first()
        .filter(|hit| hit.score > FALLBACK_MIN_SCORE)
        .map(|hit| hit.product)
}

#[cfg(test)]
mod tests {
    use super::super::test_fixtures::catalog;
    use super::*;

    #[test]
    fn test_exact_name_match() {
        let catalog = catalog();
        let p = find_product_by_name("classic linen blazer", &catalog).expect("match");
        assert_eq!(p.name, "Classic Linen Blazer");
    }

    #[test]
    fn test_substring_match_both_directions() {
        let catalog = catalog();
        // Query inside name
        assert!(find_product_by_name("loafers", &catalog).is_some());
        // Name inside query
        let p =
            find_product_by_name("the amazing leather loafers everyone loves", &catalog)
                .expect("match");
        assert_eq!(p.name, "Leather Loafers");
    }

    #[test]
    fn test_token_overlap_ignores_stop_words() {
        let catalog = catalog();
        let p = find_product_by_name("that linen blazer thing please", &catalog).expect("match");
        assert_eq!(p.name, "Classic Linen Blazer");
    }

    #[test]
    fn test_tag_only_match_is_rejected() {
        let catalog = catalog();
        // The backpack is tagged "laptop" but has no "laptop" name token;
        // the matcher must not resolve it.
        assert!(find_product_by_name("laptop", &catalog).is_none());
    }

    #[test]
    fn test_all_stop_words_resolves_nothing() {
        let catalog = catalog();
        assert!(find_product_by_name("the best item please", &catalog).is_none());
        assert!(find_product_by_name("", &catalog).is_none());
    }

    #[test]
    fn test_unknown_product_is_none() {
        let catalog = catalog();
        assert!(find_product_by_name("submarine periscope", &catalog).is_none());
    }
}
