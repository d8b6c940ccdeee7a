//! Local intent classification.
//!
//! Common commands (add, remove, view cart, checkout, clear, navigate) are
//! resolved against regex tables before any network call, so the store stays
//! responsive when the model is slow or down. A structurally matched phrase
//! whose product cannot be resolved defers to the remote model; it never
//! falls through to a later intent rule.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde_json::json;
use tracing::debug;

use stylevault_core::{Catalog, Product};

use crate::actions::{ActionRecord, StoreActions};
use crate::search::resolver::resolve_reference;
use crate::search::{pick_color, pick_size, semantic_search};

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("Invalid intent pattern"))
        .collect()
}

static ADD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)^(?:can you |please )?add\s+(?:the\s+|a\s+|an\s+|some\s+|me\s+(?:the\s+|a\s+|an\s+|some\s+)?)?(.+?)(?:\s+to\s+(?:my\s+)?cart)?(?:\s+please)?$",
        r"(?i)^(?:i(?:'ll|'d like to|'d love to| want to| wanna)\s+)?(?:buy|get|take|grab|order)\s+(?:the\s+|a\s+|an\s+|some\s+|me\s+(?:the\s+|a\s+|an\s+|some\s+)?)?(.+?)(?:\s+please)?$",
        r"(?i)^(?:put|throw|toss)\s+(?:the\s+|a\s+|an\s+|some\s+)?(.+?)(?:\s+in(?:to)?\s+(?:my\s+)?cart)?$",
        r"(?i)^(?:i(?:'ll| will)\s+take)\s+(?:the\s+|a\s+)?(.+)$",
        r"(?i)^(?:i want|i need|give me|get me)\s+(?:the\s+|a\s+|an\s+|some\s+)?(.+?)(?:\s+please)?$",
    ])
});

static REMOVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)^(?:remove|delete|take out|drop)\s+(?:the\s+|a\s+)?(.+?)(?:\s+from\s+(?:my\s+)?cart)?$",
        r"(?i)^(?:i don'?t want|cancel|nevermind on)\s+(?:the\s+|a\s+)?(.+)$",
    ])
});

static CART_VIEW_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)^(?:show|view|open|see|what'?s?\s+in)\s+(?:my\s+)?cart",
        r"(?i)^(?:go\s+to\s+)?(?:my\s+)?cart$",
    ])
});

static CHECKOUT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)^(?:check\s*out|proceed\s+to\s+check\s*out|pay|place\s+order|buy\s+everything|purchase|finish\s+order)",
        r"(?i)^(?:i'?m?\s+)?(?:done|ready|ready\s+to\s+(?:pay|check\s*out))",
    ])
});

static CLEAR_CART_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)^(?:clear|empty|reset)\s+(?:my\s+)?cart",
        r"(?i)^(?:remove|delete)\s+(?:all|everything)\s+(?:from\s+(?:my\s+)?cart)?",
    ])
});

/// Navigation phrases paired with their target path.
static NAVIGATE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)^(?:go\s+to|show\s+me|take\s+me\s+to|open|navigate\s+to)\s+(?:the\s+)?(?:home\s*page|main\s*page|front\s*page)").expect("Invalid intent pattern"),
            "/",
        ),
        (
            Regex::new(r"(?i)^(?:go\s+to|show\s+me|take\s+me\s+to|open|navigate\s+to)\s+(?:the\s+)?(?:shop|store|products?\s*page|all\s+products)").expect("Invalid intent pattern"),
            "/products",
        ),
    ]
});

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:in\s+)?(red|blue|navy|black|white|beige|brown|tan|gold|silver|rose\s*gold|green|pink|gray|grey|olive|cream|coral|burgundy|midnight|camel|lavender)\b")
        .expect("Invalid regex")
});

static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:size\s+)?(XXS|XS|S|M|L|XL|XXL|2XL|one\s*size)\b").expect("Invalid regex")
});

static SHOE_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsize\s+(\d{1,2})\b").expect("Invalid regex"));

static QTY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(?:of|x|×|pcs?|pieces?|pairs?|units?)\b").expect("Invalid regex")
});

static QTY_LEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+").expect("Invalid regex"));

static TRAILING_FILLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(please|for me|for my|now|asap|quickly|rn)$").expect("Invalid regex")
});

/// Color, size, and quantity extracted from an item description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRequest {
    /// Requested color, if stated.
    pub color: Option<String>,
    /// Requested size, if stated.
    pub size: Option<String>,
    /// Requested quantity, `1..=99`, defaulting to 1.
    pub quantity: u32,
}

/// Extract color, size, and quantity hints from free text.
///
/// Bare numbers only count as shoe sizes after the word "size", and a number
/// only counts as a quantity with a unit suffix ("2 pairs") or at the very
/// start ("2 blazers"). A number already claimed as the size is not also a
/// quantity.
#[must_use]
pub fn extract_variant(text: &str) -> VariantRequest {
    let color = COLOR_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let size = SIZE_RE
        .captures(text)
        .or_else(|| SHOE_SIZE_RE.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let quantity = QTY_SUFFIX_RE
        .captures(text)
        .or_else(|| QTY_LEADING_RE.captures(text))
        .and_then(|c| c.get(1))
        .filter(|m| size.as_deref() != Some(m.as_str()))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|&q| (1..=99).contains(&q))
        .unwrap_or(1);

    VariantRequest {
        color,
        size,
        quantity,
    }
}

/// Remove color and size words from an item description.
#[must_use]
pub fn strip_variant(text: &str) -> String {
    let without_color = COLOR_RE.replace_all(text, "");
    let without_size = SIZE_RE.replace_all(&without_color, "");
    without_size.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A locally handled command: the reply to show and the actions that ran.
#[derive(Debug)]
pub struct LocalOutcome {
    /// Clerk reply text, ready for display.
    pub reply: String,
    /// Tool executions performed, for the caller's records.
    pub actions: Vec<ActionRecord>,
}

/// Try to handle a message without the remote model.
///
/// Returns `None` when no intent table matches, or when one matches but the
/// referenced product cannot be resolved; either way the caller escalates to
/// the remote model.
pub fn detect_local_intent(
    message: &str,
    catalog: &Catalog,
    actions: &mut dyn StoreActions,
    rng: &mut impl Rng,
) -> Option<LocalOutcome> {
    let msg = message.trim();

    if let Some(caps) = ADD_PATTERNS.iter().find_map(|p| p.captures(msg)) {
        let item = caps.get(1)?.as_str().trim();
        let item = TRAILING_FILLER_RE.replace(item, "");
        return handle_add(item.trim(), catalog, actions, rng);
    }

    if let Some(caps) = REMOVE_PATTERNS.iter().find_map(|p| p.captures(msg)) {
        let item = caps.get(1)?.as_str().trim().to_lowercase();
        return handle_remove(&item, actions);
    }

    if CART_VIEW_PATTERNS.iter().any(|p| p.is_match(msg)) {
        return Some(navigate(actions, "/cart"));
    }

    if CHECKOUT_PATTERNS.iter().any(|p| p.is_match(msg)) {
        return Some(navigate(actions, "/checkout"));
    }

    if CLEAR_CART_PATTERNS.iter().any(|p| p.is_match(msg)) {
        actions.clear_cart();
        return Some(LocalOutcome {
            reply: "Cart cleared! 🧹 Fresh start. What catches your eye?".to_string(),
            actions: vec![ActionRecord::new(
                "clear_cart",
                json!({}),
                json!({"success": true}),
            )],
        });
    }

    if let Some((_, path)) = NAVIGATE_PATTERNS.iter().find(|(p, _)| p.is_match(msg)) {
        return Some(navigate(actions, path));
    }

    None
}

fn handle_add(
    item: &str,
    catalog: &Catalog,
    actions: &mut dyn StoreActions,
    rng: &mut impl Rng,
) -> Option<LocalOutcome> {
    let variant = extract_variant(item);
    let stripped = strip_variant(item);
    let query = if stripped.is_empty() { item } else { &stripped };

    let product = resolve_reference(query, catalog, rng)?;

    let color = pick_color(product, variant.color.as_deref());
    let size = pick_size(product, variant.size.as_deref());
    debug!(product = %product.name, %color, %size, quantity = variant.quantity, "local add");

    actions.add_to_cart(product, &color, &size, variant.quantity);
    let record = ActionRecord::new(
        "add_to_cart",
        json!({
            "product_id": product.id,
            "color": color,
            "size": size,
            "quantity": variant.quantity,
        }),
        json!({"success": true}),
    );

    Some(LocalOutcome {
        reply: added_reply(product, &color, &size, variant.quantity, catalog),
        actions: vec![record],
    })
}

fn handle_remove(item: &str, actions: &mut dyn StoreActions) -> Option<LocalOutcome> {
    let items = actions.cart_items();
    let (index, line) = items.iter().enumerate().find(|(_, line)| {
        let name = line.product.name.to_lowercase();
        name.contains(item) || item.contains(&name)
    })?;

    let removed = line.product.name.clone();
    actions.remove_from_cart(index);
    Some(LocalOutcome {
        reply: format!("Removed **{removed}** from your cart. Anything else?"),
        actions: vec![ActionRecord::new(
            "remove_from_cart",
            json!({"product_name": item}),
            json!({"success": true}),
        )],
    })
}

fn navigate(actions: &mut dyn StoreActions, path: &str) -> LocalOutcome {
    actions.navigate_to(path);
    let reply = match path {
        "/cart" => "Here's your cart! 🛒",
        "/checkout" => "Taking you to checkout! 💳 Let's wrap this up.",
        "/products" => "Here's the full collection! 🛍️",
        _ => "Taking you there! 🚀",
    };
    LocalOutcome {
        reply: reply.to_string(),
        actions: vec![ActionRecord::new(
            "navigate_to",
            json!({"path": path}),
            json!({"success": true}),
        )],
    }
}

/// Confirmation for a local add, with one complementary suggestion from the
/// same category when available.
fn added_reply(
    product: &Product,
    color: &str,
    size: &str,
    quantity: u32,
    catalog: &Catalog,
) -> String {
    let total = (product.price * rust_decimal::Decimal::from(quantity)).round_dp(2);
    let suggestion = semantic_search(&product.category, catalog, 2)
        .into_iter()
        .map(|h| h.product)
        .find(|p| p.id != product.id)
        .map(|p| {
            format!(
                "\n\nMight I also suggest **[{}](/product/{})** (${})? Goes great with your pick! 😉",
                p.name, p.id, p.price
            )
        })
        .unwrap_or_default();

    format!(
        "Done! ✅ Added **{}** ({color}, {size}) × {quantity} to your cart — **${total}**{suggestion}",
        product.name
    )
}
