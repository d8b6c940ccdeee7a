//! Superlative, price-range, and random-pick resolution.
//!
//! Handles comparative phrases that rank the catalog instead of naming a
//! product: "cheapest", "best rated", "top 3", "under $50", "surprise me".
//! Optionally scoped to a category inferred from whole-word keywords.
//!
//! Composition precedence, used by both the local classifier and the remote
//! tool executor: superlative > random pick > price range > name match. An
//! explicit comparative always beats fuzzy name matching.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use rust_decimal::Decimal;

use stylevault_core::{Catalog, Product};

use super::matcher::find_product_by_name;

type Comparator = fn(&Product, &Product) -> Ordering;

struct SuperlativeRule {
    patterns: &'static [&'static str],
    cmp: Comparator,
}

fn by_price_asc(a: &Product, b: &Product) -> Ordering {
    a.price.cmp(&b.price)
}

fn by_price_desc(a: &Product, b: &Product) -> Ordering {
    b.price.cmp(&a.price)
}

fn by_rating_desc(a: &Product, b: &Product) -> Ordering {
    // Rating ties break on review count.
    b.rating
        .total_cmp(&a.rating)
        .then_with(|| b.reviews.cmp(&a.reviews))
}

fn by_rating_asc(a: &Product, b: &Product) -> Ordering {
    a.rating.total_cmp(&b.rating)
}

fn by_popularity_desc(a: &Product, b: &Product) -> Ordering {
    let weight = |p: &Product| f64::from(p.rating) * f64::from(p.reviews);
    weight(b).total_cmp(&weight(a))
}

fn by_id_desc(a: &Product, b: &Product) -> Ordering {
    b.id.cmp(&a.id)
}

fn by_id_asc(a: &Product, b: &Product) -> Ordering {
    a.id.cmp(&b.id)
}

fn by_savings_desc(a: &Product, b: &Product) -> Ordering {
    b.savings().cmp(&a.savings())
}

/// Ordered rule table: first matching pattern set wins.
const SUPERLATIVE_RULES: &[SuperlativeRule] = &[
    // Price: cheapest / lowest price / most affordable
    SuperlativeRule {
        patterns: &[
            r"(?i)\bcheapest\b",
            r"(?i)\blowest\s*pric",
            r"(?i)\bmost\s*affordable\b",
            r"(?i)\bleast\s*expensive\b",
            r"(?i)\bmost\s*inexpensive\b",
        ],
        cmp: by_price_asc,
    },
    // Price: most expensive / highest price / priciest / costliest
    SuperlativeRule {
        patterns: &[
            r"(?i)\bmost\s*expensive\b",
            r"(?i)\bhighest\s*pric",
            r"(?i)\bpriciest\b",
            r"(?i)\bcostliest\b",
        ],
        cmp: by_price_desc,
    },
    // Rating: best rated / highest rated / top rated / best reviewed
    SuperlativeRule {
        patterns: &[
            r"(?i)\bbest\s*rat",
            r"(?i)\bhighest\s*rat",
            r"(?i)\btop\s*rat",
            r"(?i)\bbest\s*review",
            r"(?i)\bmost\s*popular\b",
            r"(?i)\bmost\s*review",
            r"(?i)\bfan\s*fav",
        ],
        cmp: by_rating_desc,
    },
    // Rating: worst rated / lowest rated
    SuperlativeRule {
        patterns: &[
            r"(?i)\bworst\s*rat",
            r"(?i)\blowest\s*rat",
            r"(?i)\bleast\s*popular\b",
            r"(?i)\bleast\s*rat",
        ],
        cmp: by_rating_asc,
    },
    // Generic best (rating x reviews), only when "best" is the main word
    SuperlativeRule {
        patterns: &[
            r"(?i)^(?:the\s+)?best(?:\s+(?:item|product|thing|one))?$",
            r"(?i)\btop\s*pick",
            r"(?i)\bnumber\s*one\b",
            r"(?i)#1\b",
        ],
        cmp: by_popularity_desc,
    },
    // Newest: higher ID = newer catalog entry
    SuperlativeRule {
        patterns: &[
            r"(?i)\bnewest\b",
            r"(?i)\blatest\b",
            r"(?i)\bmost\s*recent\b",
            r"(?i)\bnew\s*arrival",
            r"(?i)\bjust\s*(?:arrived|dropped|in)\b",
        ],
        cmp: by_id_desc,
    },
    // Oldest: only the explicit word; "first"/"original" proved too ambiguous
    SuperlativeRule {
        patterns: &[r"(?i)\boldest\b"],
        cmp: by_id_asc,
    },
    // Most discounted (original price minus price)
    SuperlativeRule {
        patterns: &[
            r"(?i)(?:biggest|best|most|highest)\s*discount",
            r"(?i)(?:biggest|best|most)\s*deal",
            r"(?i)(?:biggest|best|most)\s*(?:sale|savings?)\b",
            r"(?i)\bon\s*sale\b",
        ],
        cmp: by_savings_desc,
    },
];

static COMPILED_RULES: LazyLock<Vec<(Vec<Regex>, Comparator)>> = LazyLock::new(|| {
    SUPERLATIVE_RULES
        .iter()
        .map(|rule| {
            let patterns = rule
                .patterns
                .iter()
                .map(|p| Regex::new(p).expect("Invalid superlative pattern"))
                .collect();
            (patterns, rule.cmp)
        })
        .collect()
});

/// Category keyword table: whole-word keyword -> catalog category.
const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("clothing", "Clothing"),
    ("clothes", "Clothing"),
    ("apparel", "Clothing"),
    ("fashion", "Clothing"),
    ("shirt", "Clothing"),
    ("shirts", "Clothing"),
    ("blazer", "Clothing"),
    ("blazers", "Clothing"),
    ("dress", "Clothing"),
    ("dresses", "Clothing"),
    ("jacket", "Clothing"),
    ("jackets", "Clothing"),
    ("pants", "Clothing"),
    ("trousers", "Clothing"),
    ("accessories", "Accessories"),
    ("accessory", "Accessories"),
    ("jewelry", "Accessories"),
    ("jewellery", "Accessories"),
    ("watch", "Accessories"),
    ("watches", "Accessories"),
    ("bag", "Accessories"),
    ("bags", "Accessories"),
    ("sunglasses", "Accessories"),
    ("electronics", "Electronics"),
    ("electronic", "Electronics"),
    ("tech", "Electronics"),
    ("gadget", "Electronics"),
    ("gadgets", "Electronics"),
    ("headphones", "Electronics"),
    ("speaker", "Electronics"),
    ("speakers", "Electronics"),
    ("shoes", "Shoes"),
    ("shoe", "Shoes"),
    ("footwear", "Shoes"),
    ("sneakers", "Shoes"),
    ("loafers", "Shoes"),
    ("boots", "Shoes"),
];

static CATEGORY_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(keyword, category)| {
            let re = Regex::new(&format!(r"(?i)\b{keyword}s?\b")).expect("Invalid keyword");
            (re, *category)
        })
        .collect()
});

static RANDOM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:random|surprise|anything|whatever|you\s*(?:pick|choose|decide)|dealer'?s?\s*choice)\b")
        .expect("Invalid regex")
});

static UNDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:under|below|less\s*than|cheaper\s*than|max|up\s*to)\s*\$?(\d+(?:\.\d{1,2})?)")
        .expect("Invalid regex")
});

static OVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:over|above|more\s*than|at\s*least|min(?:imum)?)\s*\$?(\d+(?:\.\d{1,2})?)")
        .expect("Invalid regex")
});

static BETWEEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:between\s+)?\$?(\d+(?:\.\d{1,2})?)\s*(?:and|to|-|–)\s*\$?(\d+(?:\.\d{1,2})?)")
        .expect("Invalid regex")
});

static AROUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:around|about|approximately|roughly|~)\s*\$?(\d+(?:\.\d{1,2})?)")
        .expect("Invalid regex")
});

static TOP_N_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(\d+)\s+(?:cheapest|most\s*expensive|best|top|lowest|highest)",
        r"(?i)(?:cheapest|most\s*expensive|best|top|lowest|highest)\s+(\d+)",
        r"(?i)top\s+(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

/// Infer a category scope from whole-word keywords.
///
/// Word boundaries matter: "bag" must not match inside "baggy".
#[must_use]
pub fn match_category(query: &str) -> Option<&'static str> {
    CATEGORY_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(query))
        .map(|(_, category)| *category)
}

fn scoped_pool<'a>(query: &str, catalog: &'a Catalog) -> Vec<&'a Product> {
    let category = match_category(query);
    catalog
        .in_stock()
        .filter(|p| category.is_none_or(|c| p.category == c))
        .collect()
}

/// Resolve a superlative phrase ("cheapest shoes") to its top product.
///
/// Returns `None` when the phrase is not a superlative, or when the scoped
/// in-stock pool is empty; never falls back across categories.
#[must_use]
pub fn resolve_superlative<'a>(query: &str, catalog: &'a Catalog) -> Option<&'a Product> {
    let q = query.to_lowercase();
    let q = q.trim();

    for (patterns, cmp) in COMPILED_RULES.iter() {
        if !patterns.iter().any(|p| p.is_match(q)) {
            continue;
        }
        let mut pool = scoped_pool(q, catalog);
        if pool.is_empty() {
            return None;
        }
        pool.sort_by(|a, b| cmp(a, b));
        return pool.first().copied();
    }

    None
}

/// Resolve "top N" / "3 cheapest" phrases to the first N ranked products.
#[must_use]
pub fn resolve_superlative_multiple<'a>(
    query: &str,
    catalog: &'a Catalog,
) -> Option<Vec<&'a Product>> {
    let q = query.to_lowercase();
    let q = q.trim();

    let n: usize = TOP_N_RES
        .iter()
        .find_map(|re| re.captures(q))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())?;
    if !(1..=25).contains(&n) {
        return None;
    }

    for (patterns, cmp) in COMPILED_RULES.iter() {
        if !patterns.iter().any(|p| p.is_match(q)) {
            continue;
        }
        let mut pool = scoped_pool(q, catalog);
        pool.sort_by(|a, b| cmp(a, b));
        pool.truncate(n);
        return Some(pool);
    }

    None
}

fn capture_amount(re: &Regex, q: &str, group: usize) -> Option<Decimal> {
    re.captures(q)
        .and_then(|caps| caps.get(group))
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
}

/// Resolve a price-range phrase to matching products, cheapest first.
///
/// Grammar: "under/below/max $X" (upper bound), "over/at least $X" (lower
/// bound), "between $X and $Y" / "$X to $Y" / "$X-$Y" (both, order
/// normalized), "around $X" (±25% band, only without an explicit bound).
#[must_use]
pub fn resolve_price_range<'a>(query: &str, catalog: &'a Catalog) -> Option<Vec<&'a Product>> {
    let q = query.to_lowercase();
    let q = q.trim();

    let under = capture_amount(&UNDER_RE, q, 1);
    let over = capture_amount(&OVER_RE, q, 1);
    let between = BETWEEN_RE.captures(q).and_then(|caps| {
        let lo = Decimal::from_str(caps.get(1)?.as_str()).ok()?;
        let hi = Decimal::from_str(caps.get(2)?.as_str()).ok()?;
        Some(if lo > hi { (hi, lo) } else { (lo, hi) })
    });

    let mut min = over.unwrap_or(Decimal::ZERO);
    let mut max = under;
    if let Some((lo, hi)) = between {
        min = lo;
        max = Some(hi);
    } else if under.is_none() && over.is_none() {
        // "around $X" applies only when no explicit bound was given.
        if let Some(target) = capture_amount(&AROUND_RE, q, 1) {
            min = target * Decimal::new(75, 2);
            max = Some(target * Decimal::new(125, 2));
        } else {
            return None;
        }
    }

    let category = match_category(q);
    let mut pool: Vec<&Product> = catalog
        .in_stock()
        .filter(|p| p.price >= min && max.is_none_or(|m| p.price <= m))
        .filter(|p| category.is_none_or(|c| p.category == c))
        .collect();

    if pool.is_empty() {
        return None;
    }
    pool.sort_by(|a, b| a.price.cmp(&b.price));
    Some(pool)
}

/// Pick a uniformly random in-stock product when the phrase asks for one
/// ("surprise me", "dealer's choice"), optionally category-scoped.
#[must_use]
pub fn resolve_random<'a>(
    query: &str,
    catalog: &'a Catalog,
    rng: &mut impl Rng,
) -> Option<&'a Product> {
    let q = query.to_lowercase();
    let q = q.trim();
    if !RANDOM_RE.is_match(q) {
        return None;
    }

    let pool = scoped_pool(q, catalog);
    if pool.is_empty() {
        return None;
    }
    let index = rng.random_range(0..pool.len());
    pool.get(index).copied()
}

/// Resolve a product reference with the full precedence chain:
/// superlative > random pick > price range (head) > name match.
#[must_use]
pub fn resolve_reference<'a>(
    query: &str,
    catalog: &'a Catalog,
    rng: &mut impl Rng,
) -> Option<&'a Product> {
    if let Some(p) = resolve_superlative(query, catalog) {
        return Some(p);
    }
    if let Some(p) = resolve_random(query, catalog, rng) {
        return Some(p);
    }
    if let Some(pool) = resolve_price_range(query, catalog) {
        return pool.first().copied();
    }
    find_product_by_name(query, catalog)
}

#[cfg(test)]
mod tests {
    use super::super::test_fixtures::{catalog, product};
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use stylevault_core::Catalog;

    #[test]
    fn test_cheapest_overall() {
        let catalog = catalog();
        let p = resolve_superlative("cheapest item in the store", &catalog).expect("match");
        assert_eq!(p.name, "Minimalist Backpack");
    }

    #[test]
    fn test_cheapest_scoped_to_category() {
        let catalog = catalog();
        let p = resolve_superlative("cheapest shoes", &catalog).expect("match");
        // Sneakers ($95) beat loafers ($120); the backpack ($65) is not a shoe.
        assert_eq!(p.name, "Running Sneakers");
    }

    #[test]
    fn test_no_in_stock_category_yields_none() {
        let mut sold_out = product(
            1,
            "Leather Loafers",
            "Shoes",
            "Loafers",
            Decimal::new(12000, 2),
            4.8,
            86,
            &[],
        );
        sold_out.in_stock = false;
        let catalog = Catalog::new(vec![sold_out]);
        // No cross-category fallback: empty Shoes pool means no result.
        assert!(resolve_superlative("cheapest shoes", &catalog).is_none());
    }

    #[test]
    fn test_word_boundary_category_matching() {
        assert_eq!(match_category("a bag for work"), Some("Accessories"));
        // "bag" must not match inside "baggy".
        assert_eq!(match_category("baggy jeans"), Some("Clothing"));
        assert_eq!(match_category("something baggy"), None);
    }

    #[test]
    fn test_best_rated_breaks_ties_on_reviews() {
        let a = product(1, "A", "Clothing", "X", Decimal::new(100, 0), 4.5, 10, &[]);
        let b = product(2, "B", "Clothing", "X", Decimal::new(100, 0), 4.5, 500, &[]);
        let catalog = Catalog::new(vec![a, b]);
        let p = resolve_superlative("best rated", &catalog).expect("match");
        assert_eq!(p.name, "B");
    }

    #[test]
    fn test_top_n() {
        let catalog = catalog();
        let top = resolve_superlative_multiple("top 3 cheapest", &catalog).expect("match");
        assert_eq!(top.len(), 3);
        assert_eq!(top.first().map(|p| p.name.as_str()), Some("Minimalist Backpack"));
    }

    #[test]
    fn test_top_n_rejects_out_of_range() {
        let catalog = catalog();
        assert!(resolve_superlative_multiple("top 0 cheapest", &catalog).is_none());
        assert!(resolve_superlative_multiple("top 26 cheapest", &catalog).is_none());
    }

    #[test]
    fn test_price_range_under() {
        let catalog = catalog();
        let pool = resolve_price_range("under $100", &catalog).expect("match");
        assert!(pool.iter().all(|p| p.price <= Decimal::from(100)));
        // Sorted ascending.
        assert_eq!(pool.first().map(|p| p.name.as_str()), Some("Minimalist Backpack"));
    }

    #[test]
    fn test_price_range_between_normalizes_order() {
        let catalog = catalog();
        let pool = resolve_price_range("between $130 and $60", &catalog).expect("match");
        assert!(
            pool.iter()
                .all(|p| p.price >= Decimal::from(60) && p.price <= Decimal::from(130))
        );
    }

    #[test]
    fn test_price_range_around_is_a_band() {
        let catalog = catalog();
        // around $100 -> [75, 125]: blazer ($89.99), sneakers ($95), loafers ($120)
        let pool = resolve_price_range("around $100", &catalog).expect("match");
        let names: Vec<&str> = pool.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Classic Linen Blazer", "Running Sneakers", "Leather Loafers"]
        );
    }

    #[test]
    fn test_no_price_phrase_is_none() {
        let catalog = catalog();
        assert!(resolve_price_range("a nice blazer", &catalog).is_none());
    }

    #[test]
    fn test_random_pick_is_scoped() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let p = resolve_random("surprise me with shoes", &catalog, &mut rng).expect("match");
            assert_eq!(p.category, "Shoes");
        }
        assert!(resolve_random("a blazer", &catalog, &mut rng).is_none());
    }

    #[test]
    fn test_reference_precedence_superlative_over_name() {
        // "cheapest blazer" scopes to Clothing and ranks by price; the
        // ranked result wins even though "blazer" also name-matches.
        let blazer = product(
            1,
            "Classic Linen Blazer",
            "Clothing",
            "Blazers",
            Decimal::new(8999, 2),
            4.5,
            128,
            &[],
        );
        let tee = product(
            2,
            "Cotton T-Shirt",
            "Clothing",
            "Tops",
            Decimal::new(2500, 2),
            4.1,
            300,
            &[],
        );
        let catalog = Catalog::new(vec![blazer, tee]);
        let mut rng = StdRng::seed_from_u64(7);
        let p = resolve_reference("cheapest blazer", &catalog, &mut rng).expect("match");
        assert_eq!(p.name, "Cotton T-Shirt");
    }
}
