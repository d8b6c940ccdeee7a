//! Tool manifest offered to the remote model.
//!
//! Eleven function tools covering search, inventory, cart mutation, store
//! filters, navigation, discount negotiation, and recommendations. Execution
//! lives in [`executor`].

pub mod executor;

use serde_json::json;

use crate::llm::ToolDef;

pub use executor::ToolExecutor;

/// Tool name constants, shared between the manifest and the executor.
pub mod names {
    pub const SEARCH_PRODUCTS: &str = "search_products";
    pub const CHECK_INVENTORY: &str = "check_inventory";
    pub const ADD_TO_CART: &str = "add_to_cart";
    pub const SEARCH_AND_ADD_TO_CART: &str = "search_and_add_to_cart";
    pub const REMOVE_FROM_CART: &str = "remove_from_cart";
    pub const VIEW_CART: &str = "view_cart";
    pub const CLEAR_CART: &str = "clear_cart";
    pub const UPDATE_FILTERS: &str = "update_filters";
    pub const NAVIGATE_TO: &str = "navigate_to";
    pub const HAGGLE_DISCOUNT: &str = "haggle_discount";
    pub const GET_RECOMMENDATIONS: &str = "get_recommendations";
}

/// Build the full tool manifest.
#[must_use]
pub fn manifest() -> Vec<ToolDef> {
    vec![
        ToolDef::function(
            names::SEARCH_PRODUCTS,
            "Search the store for products. Use ONLY when user wants to BROWSE or SEE products, \
             NOT when they want to add/buy.",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query"},
                    "limit": {"type": "number", "description": "Max results (default 4)"}
                },
                "required": ["query"]
            }),
        ),
        ToolDef::function(
            names::CHECK_INVENTORY,
            "Check if a product is available in a color or size.",
            json!({
                "type": "object",
                "properties": {
                    "product_id": {"type": "number", "description": "Product ID"},
                    "color": {"type": "string", "description": "Color to check"},
                    "size": {"type": "string", "description": "Size to check"}
                },
                "required": ["product_id"]
            }),
        ),
        ToolDef::function(
            names::ADD_TO_CART,
            "Add a product to cart by its ID. Use when you know the exact product ID.",
            json!({
                "type": "object",
                "properties": {
                    "product_id": {"type": "number", "description": "Product ID"},
                    "color": {"type": "string", "description": "Color (optional)"},
                    "size": {"type": "string", "description": "Size (optional)"},
                    "quantity": {"type": "number", "description": "Quantity (default 1)"}
                },
                "required": ["product_id"]
            }),
        ),
        ToolDef::function(
            names::SEARCH_AND_ADD_TO_CART,
            "Search for a product by name/description and IMMEDIATELY add the best match to \
             cart. THIS IS THE PREFERRED TOOL for any purchase intent. Use for: 'add X', \
             'buy X', 'get X', 'I want X', 'I'll take X'.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Product name or description to find and add"
                    },
                    "color": {"type": "string", "description": "Preferred color (optional)"},
                    "size": {"type": "string", "description": "Preferred size (optional)"},
                    "quantity": {"type": "number", "description": "Quantity (default 1)"}
                },
                "required": ["query"]
            }),
        ),
        ToolDef::function(
            names::REMOVE_FROM_CART,
            "Remove a product from the cart by name. Use when user says 'remove X'.",
            json!({
                "type": "object",
                "properties": {
                    "product_name": {
                        "type": "string",
                        "description": "Name of product to remove"
                    }
                },
                "required": ["product_name"]
            }),
        ),
        ToolDef::function(
            names::VIEW_CART,
            "Show current cart contents and total.",
            json!({"type": "object", "properties": {}}),
        ),
        ToolDef::function(
            names::CLEAR_CART,
            "Empty the entire cart.",
            json!({"type": "object", "properties": {}}),
        ),
        ToolDef::function(
            names::UPDATE_FILTERS,
            "Change website display: sort, category, search filter. Navigates to /products \
             automatically.",
            json!({
                "type": "object",
                "properties": {
                    "sort_by": {
                        "type": "string",
                        "enum": ["featured", "price-low", "price-high", "rating", "name"]
                    },
                    "category": {
                        "type": "string",
                        "description": "'All', 'Clothing', 'Accessories', 'Electronics', 'Shoes'"
                    },
                    "search": {"type": "string", "description": "Search filter text"},
                    "highlight_ids": {"type": "array", "items": {"type": "number"}}
                }
            }),
        ),
        ToolDef::function(
            names::NAVIGATE_TO,
            "Go to a page: '/', '/products', '/product/{id}', '/cart', '/checkout'",
            json!({
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"]
            }),
        ),
        ToolDef::function(
            names::HAGGLE_DISCOUNT,
            "Handle discount negotiation. Be fun, give discounts for good reasons.",
            json!({
                "type": "object",
                "properties": {
                    "approved": {"type": "boolean"},
                    "discount_percent": {
                        "type": "number",
                        "description": "5-30% MAX. Never exceed 30. System will cap at 30."
                    },
                    "coupon_code": {"type": "string", "description": "e.g. BDAY-20"},
                    "reason": {"type": "string"}
                },
                "required": ["approved", "reason"]
            }),
        ),
        ToolDef::function(
            names::GET_RECOMMENDATIONS,
            "Get personalized recommendations based on browsing/cart history.",
            json!({
                "type": "object",
                "properties": {"limit": {"type": "number"}}
            }),
        ),
    ]
}
