//! Tool execution against the catalog and the store-action seam.
//!
//! Every tool returns a JSON value that goes back to the model verbatim, so
//! failures are structured results (`success: false`), never errors: the
//! model is expected to recover conversationally.

use serde_json::{Value, json};
use tracing::instrument;

use stylevault_core::{Catalog, Coupon, Product, ProductId};

use crate::actions::StoreActions;
use crate::search::matcher::find_product_by_name;
use crate::search::resolver::{
    resolve_reference, resolve_superlative, resolve_superlative_multiple,
};
use crate::search::{
    color_available, pick_color, pick_size, recommendations, semantic_search, size_available,
};

use super::names;

const DEFAULT_SEARCH_LIMIT: usize = 4;
const DEFAULT_RECOMMENDATION_LIMIT: usize = 4;

/// Executes model tool calls against a catalog and a [`StoreActions`] sink.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    catalog: Catalog,
}

impl ToolExecutor {
    /// Create an executor over a catalog.
    #[must_use]
    pub const fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Execute one tool call.
    ///
    /// Unknown tool names return an `error` payload rather than failing, so
    /// a confused model gets corrected instead of crashing the turn.
    #[instrument(skip(self, args, actions), fields(tool = name))]
    pub fn execute(&self, name: &str, args: &Value, actions: &mut dyn StoreActions) -> Value {
        match name {
            names::SEARCH_PRODUCTS => self.search_products(args),
            names::CHECK_INVENTORY => self.check_inventory(args),
            names::ADD_TO_CART => self.add_to_cart(args, actions),
            names::SEARCH_AND_ADD_TO_CART => self.search_and_add_to_cart(args, actions),
            names::REMOVE_FROM_CART => Self::remove_from_cart(args, actions),
            names::VIEW_CART => Self::view_cart(actions),
            names::CLEAR_CART => Self::clear_cart(actions),
            names::UPDATE_FILTERS => Self::update_filters(args, actions),
            names::NAVIGATE_TO => Self::navigate_to(args, actions),
            names::HAGGLE_DISCOUNT => Self::haggle_discount(args, actions),
            names::GET_RECOMMENDATIONS => self.get_recommendations(args, actions),
            other => json!({"error": format!("Unknown function: {other}")}),
        }
    }

    fn search_products(&self, args: &Value) -> Value {
        let query = str_arg(args, "query").unwrap_or_default();

        // Superlative queries bypass scoring: the ranked pick is definitive.
        if let Some(ranked) = resolve_superlative_multiple(query, &self.catalog) {
            if !ranked.is_empty() {
                return json!({
                    "results": ranked.iter().map(|p| search_row(p, 100)).collect::<Vec<_>>(),
                    "query": query,
                });
            }
        }
        if let Some(top) = resolve_superlative(query, &self.catalog) {
            return json!({
                "results": [search_row(top, 100)],
                "query": query,
            });
        }

        let limit = args
            .get("limit")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_SEARCH_LIMIT, |n| n as usize);
        let hits = semantic_search(query, &self.catalog, limit);
        json!({
            "results": hits
                .iter()
                .map(|h| search_row(h.product, h.score))
                .collect::<Vec<_>>(),
            "query": query,
        })
    }

    fn check_inventory(&self, args: &Value) -> Value {
        let Some(product) = product_id_arg(args).and_then(|id| self.catalog.get(id)) else {
            return json!({"found": false, "message": "Product not found"});
        };

        let mut result = json!({
            "found": true,
            "name": product.name,
            "in_stock": product.in_stock,
        });
        if let Some(color) = str_arg(args, "color") {
            result["color_available"] = json!(color_available(product, color));
            result["available_colors"] = json!(product.colors);
        }
        if let Some(size) = str_arg(args, "size") {
            result["size_available"] = json!(size_available(product, size));
            result["available_sizes"] = json!(product.sizes);
        }
        result
    }

    fn add_to_cart(&self, args: &Value, actions: &mut dyn StoreActions) -> Value {
        // ID first; models sometimes send the name in the ID slot.
        let product = product_id_arg(args)
            .and_then(|id| self.catalog.get(id))
            .or_else(|| {
                args.get("product_id")
                    .and_then(Value::as_str)
                    .and_then(|s| find_product_by_name(s, &self.catalog))
            });
        let Some(product) = product else {
            return json!({
                "success": false,
                "message": "Product not found. Try search_and_add_to_cart with a product description.",
            });
        };

        let color = pick_color(product, str_arg(args, "color"));
        let size = pick_size(product, str_arg(args, "size"));
        let quantity = quantity_arg(args);

        actions.add_to_cart(product, &color, &size, quantity);
        json!({
            "success": true,
            "product": product.name,
            "color": color,
            "size": size,
            "quantity": quantity,
            "total_price": product.price * rust_decimal::Decimal::from(quantity),
        })
    }

    fn search_and_add_to_cart(&self, args: &Value, actions: &mut dyn StoreActions) -> Value {
        let query = str_arg(args, "query").unwrap_or_default();

        let direct = resolve_reference(query, &self.catalog, &mut rand::rng());

        if let Some(product) = direct.filter(|p| p.in_stock) {
            return self.commit_add(product, args, actions, &[]);
        }

        // Fall back to semantic search.
        let hits = semantic_search(query, &self.catalog, 3);
        let Some(best) = hits.first() else {
            return json!({
                "success": false,
                "message": format!("No products found matching \"{query}\""),
            });
        };
        let alternatives: Vec<Value> = hits
            .iter()
            .skip(1)
            .map(|h| {
                json!({"id": h.product.id, "name": h.product.name, "price": h.product.price})
            })
            .collect();
        if !best.product.in_stock {
            return json!({
                "success": false,
                "message": format!("Found \"{}\" but it's out of stock", best.product.name),
                "alternatives": alternatives,
            });
        }

        self.commit_add(best.product, args, actions, &alternatives)
    }

    fn commit_add(
        &self,
        product: &Product,
        args: &Value,
        actions: &mut dyn StoreActions,
        other_matches: &[Value],
    ) -> Value {
        let color = pick_color(product, str_arg(args, "color"));
        let size = pick_size(product, str_arg(args, "size"));
        let quantity = quantity_arg(args);

        actions.add_to_cart(product, &color, &size, quantity);
        let mut result = json!({
            "success": true,
            "product": product.name,
            "product_id": product.id,
            "price": product.price,
            "color": color,
            "size": size,
            "quantity": quantity,
            "total_price": product.price * rust_decimal::Decimal::from(quantity),
        });
        if !other_matches.is_empty() {
            result["other_matches"] = json!(other_matches);
        }
        result
    }

    fn remove_from_cart(args: &Value, actions: &mut dyn StoreActions) -> Value {
        let name_query = str_arg(args, "product_name").unwrap_or_default().to_lowercase();
        let items = actions.cart_items();
        let hit = items.iter().enumerate().find(|(_, item)| {
            let name = item.product.name.to_lowercase();
            name.contains(&name_query) || name_query.contains(&name)
        });
        if let Some((index, line)) = hit {
            let removed = line.product.name.clone();
            actions.remove_from_cart(index);
            json!({"success": true, "removed": removed})
        } else {
            json!({
                "success": false,
                "message": format!(
                    "\"{}\" not found in cart",
                    str_arg(args, "product_name").unwrap_or_default()
                ),
            })
        }
    }

    fn view_cart(actions: &mut dyn StoreActions) -> Value {
        let items = actions.cart_items();
        if items.is_empty() {
            return json!({"items": [], "message": "Cart is empty!", "total": 0});
        }
        let totals = actions.cart_totals();
        json!({
            "items": items
                .iter()
                .enumerate()
                .map(|(i, item)| json!({
                    "index": i,
                    "name": item.product.name,
                    "price": item.product.price,
                    "quantity": item.quantity,
                    "color": item.selected_color,
                    "size": item.selected_size,
                    "line_total": item.line_total(),
                }))
                .collect::<Vec<_>>(),
            "item_count": items.len(),
            "subtotal": totals.subtotal,
            "discount": totals.discount,
            "total": totals.total,
        })
    }

    fn clear_cart(actions: &mut dyn StoreActions) -> Value {
        actions.clear_cart();
        json!({"success": true, "message": "Cart cleared!"})
    }

    fn update_filters(args: &Value, actions: &mut dyn StoreActions) -> Value {
        let mut updates = serde_json::Map::new();
        if let Some(sort) = str_arg(args, "sort_by") {
            actions.set_sort_by(sort);
            updates.insert("sort_by".to_string(), json!(sort));
        }
        if let Some(category) = str_arg(args, "category") {
            actions.set_selected_category(category);
            updates.insert("category".to_string(), json!(category));
        }
        if let Some(search) = str_arg(args, "search") {
            actions.set_search_query(search);
            updates.insert("search".to_string(), json!(search));
        }
        if let Some(ids) = args.get("highlight_ids").and_then(Value::as_array) {
            let ids: Vec<ProductId> = ids
                .iter()
                .filter_map(Value::as_i64)
                .filter_map(|n| i32::try_from(n).ok())
                .map(ProductId::new)
                .collect();
            actions.set_highlighted_products(&ids);
            updates.insert("highlighted".to_string(), json!(ids));
        }
        // Filter changes always land the user on the listing page.
        actions.navigate_to("/products");
        json!({"success": true, "updates": updates, "message": "Website updated!"})
    }

    fn navigate_to(args: &Value, actions: &mut dyn StoreActions) -> Value {
        let path = str_arg(args, "path").unwrap_or("/");
        actions.navigate_to(path);
        json!({"success": true, "path": path})
    }

    fn haggle_discount(args: &Value, actions: &mut dyn StoreActions) -> Value {
        let approved = args
            .get("approved")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let percent = args.get("discount_percent").and_then(Value::as_i64);
        let code = str_arg(args, "coupon_code");

        if approved
            && let (Some(percent), Some(code)) = (percent, code)
        {
            // Coupon construction clamps to the hard cap regardless of what
            // the model asked for.
            let coupon = Coupon::new(code, percent);
            let discount = coupon.discount_percent();
            actions.apply_coupon(coupon);
            return json!({
                "success": true,
                "coupon": code,
                "discount": discount,
                "message": format!("Coupon {code} applied! {discount}% off."),
            });
        }
        json!({
            "success": false,
            "approved": false,
            "reason": str_arg(args, "reason").unwrap_or_default(),
        })
    }

    fn get_recommendations(&self, args: &Value, actions: &mut dyn StoreActions) -> Value {
        let limit = args
            .get("limit")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_RECOMMENDATION_LIMIT, |n| n as usize);
        let recs = recommendations(&actions.activity(), &self.catalog, limit);
        json!({
            "recommendations": recs
                .iter()
                .map(|p| json!({
                    "id": p.id,
                    "name": p.name,
                    "price": p.price,
                    "rating": p.rating,
                    "category": p.category,
                    "description": p.description,
                }))
                .collect::<Vec<_>>(),
        })
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Product IDs arrive as numbers or as numeric strings.
fn product_id_arg(args: &Value) -> Option<ProductId> {
    let value = args.get("product_id")?;
    let id = match value {
        Value::Number(n) => i32::try_from(n.as_i64()?).ok()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Some(ProductId::new(id))
}

fn quantity_arg(args: &Value) -> u32 {
    args.get("quantity")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

fn search_row(p: &Product, score: u32) -> Value {
    json!({
        "id": p.id,
        "name": p.name,
        "price": p.price,
        "rating": p.rating,
        "reviews": p.reviews,
        "category": p.category,
        "colors": p.colors,
        "sizes": p.sizes,
        "description": p.description,
        "in_stock": p.in_stock,
        "relevance_score": score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::MemoryCart;
    use crate::search::test_fixtures::catalog;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn executor() -> ToolExecutor {
        ToolExecutor::new(catalog())
    }

    #[test]
    fn test_search_products_superlative_scores_100() {
        let mut cart = MemoryCart::new();
        let result = executor().execute(
            names::SEARCH_PRODUCTS,
            &json!({"query": "cheapest item"}),
            &mut cart,
        );
        let results = result["results"].as_array().expect("results");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["name"], "Minimalist Backpack");
        assert_eq!(results[0]["relevance_score"], 100);
    }

    #[test]
    fn test_search_products_semantic_fallback() {
        let mut cart = MemoryCart::new();
        let result = executor().execute(
            names::SEARCH_PRODUCTS,
            &json!({"query": "wedding", "limit": 2}),
            &mut cart,
        );
        let results = result["results"].as_array().expect("results");
        assert!(!results.is_empty());
        assert!(results.len() <= 2);
    }

    #[test]
    fn test_check_inventory_reports_color_and_size() {
        let mut cart = MemoryCart::new();
        let result = executor().execute(
            names::CHECK_INVENTORY,
            &json!({"product_id": 1, "color": "black", "size": "XL"}),
            &mut cart,
        );
        assert_eq!(result["found"], true);
        assert_eq!(result["color_available"], true);
        assert_eq!(result["size_available"], false);
    }

    #[test]
    fn test_add_to_cart_accepts_string_id() {
        let mut cart = MemoryCart::new();
        let result = executor().execute(
            names::ADD_TO_CART,
            &json!({"product_id": "2", "quantity": 2}),
            &mut cart,
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["product"], "Leather Loafers");
        assert_eq!(cart.cart_items().len(), 1);
    }

    #[test]
    fn test_add_to_cart_falls_back_to_name() {
        let mut cart = MemoryCart::new();
        let result = executor().execute(
            names::ADD_TO_CART,
            &json!({"product_id": "leather loafers"}),
            &mut cart,
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["product"], "Leather Loafers");
    }

    #[test]
    fn test_search_and_add_prefers_superlative() {
        let mut cart = MemoryCart::new();
        let result = executor().execute(
            names::SEARCH_AND_ADD_TO_CART,
            &json!({"query": "the cheapest thing you have"}),
            &mut cart,
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["product"], "Minimalist Backpack");
    }

    #[test]
    fn test_search_and_add_honors_color_and_quantity() {
        let mut cart = MemoryCart::new();
        let result = executor().execute(
            names::SEARCH_AND_ADD_TO_CART,
            &json!({"query": "linen blazer", "color": "black", "quantity": 3}),
            &mut cart,
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["color"], "Black");
        assert_eq!(result["quantity"], 3);
        assert_eq!(
            cart.cart_items().first().map(|l| l.quantity),
            Some(3)
        );
    }

    #[test]
    fn test_search_and_add_unknown_query_fails() {
        let mut cart = MemoryCart::new();
        let result = executor().execute(
            names::SEARCH_AND_ADD_TO_CART,
            &json!({"query": "submarine periscope"}),
            &mut cart,
        );
        assert_eq!(result["success"], false);
        assert!(cart.cart_items().is_empty());
    }

    #[test]
    fn test_remove_from_cart_matches_substring() {
        let mut cart = MemoryCart::new();
        let exec = executor();
        exec.execute(
            names::SEARCH_AND_ADD_TO_CART,
            &json!({"query": "leather loafers"}),
            &mut cart,
        );
        let result = exec.execute(
            names::REMOVE_FROM_CART,
            &json!({"product_name": "loafers"}),
            &mut cart,
        );
        assert_eq!(result["success"], true);
        assert!(cart.cart_items().is_empty());
    }

    #[test]
    fn test_view_cart_includes_totals() {
        let mut cart = MemoryCart::new();
        let exec = executor();
        exec.execute(
            names::SEARCH_AND_ADD_TO_CART,
            &json!({"query": "leather loafers", "quantity": 2}),
            &mut cart,
        );
        let result = exec.execute(names::VIEW_CART, &json!({}), &mut cart);
        assert_eq!(result["item_count"], 1);
        assert_eq!(result["items"][0]["quantity"], 2);
        assert_eq!(
            result["subtotal"],
            serde_json::to_value(Decimal::new(24000, 2)).expect("decimal")
        );
    }

    #[test]
    fn test_haggle_clamps_to_cap() {
        let mut cart = MemoryCart::new();
        let result = executor().execute(
            names::HAGGLE_DISCOUNT,
            &json!({
                "approved": true,
                "discount_percent": 95,
                "coupon_code": "MEGA-95",
                "reason": "asked nicely"
            }),
            &mut cart,
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["discount"], 30);
        assert_eq!(cart.coupon().map(Coupon::discount_percent), Some(30));
    }

    #[test]
    fn test_haggle_rejection_applies_nothing() {
        let mut cart = MemoryCart::new();
        let result = executor().execute(
            names::HAGGLE_DISCOUNT,
            &json!({"approved": false, "reason": "lowball"}),
            &mut cart,
        );
        assert_eq!(result["success"], false);
        assert!(cart.coupon().is_none());
    }

    #[test]
    fn test_update_filters_navigates_to_products() {
        let mut cart = MemoryCart::new();
        let result = executor().execute(
            names::UPDATE_FILTERS,
            &json!({"sort_by": "price-low", "category": "Shoes"}),
            &mut cart,
        );
        assert_eq!(result["success"], true);
        assert_eq!(cart.sort_by.as_deref(), Some("price-low"));
        assert_eq!(cart.selected_category.as_deref(), Some("Shoes"));
        assert_eq!(cart.current_path.as_deref(), Some("/products"));
    }

    #[test]
    fn test_unknown_tool_returns_error_payload() {
        let mut cart = MemoryCart::new();
        let result = executor().execute("teleport", &json!({}), &mut cart);
        assert!(result["error"].as_str().expect("error").contains("teleport"));
    }
}
