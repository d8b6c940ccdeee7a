//! Integration test support for the StyleVault clerk engine.
//!
//! Provides a scripted [`ChatModel`] double and a shared catalog fixture so
//! tests can drive full conversations through [`stylevault_clerk::ClerkService`]
//! without a network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stylevault-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::VecDeque;
use std::sync::Mutex;

use rust_decimal::Decimal;

use stylevault_clerk::llm::{
    ChatCompletion, ChatMessage, ChatModel, ChatRequest, Choice, FunctionCall, LlmError, Role,
    ToolCall,
};
use stylevault_core::{Catalog, Product, ProductId};

/// A chat model that replays a fixed script and records every request.
///
/// Panics if the script runs out; a test that makes more model calls than it
/// scripted is a failing test.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<ChatCompletion, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    /// Create a model that answers with `script` entries, in order.
    #[must_use]
    pub fn new(script: Vec<Result<ChatCompletion, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// All requests received so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl ChatModel for ScriptedModel {
    fn chat(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatCompletion, LlmError>> + Send {
        self.requests.lock().expect("lock").push(request);
        let next = self
            .script
            .lock()
            .expect("lock")
            .pop_front()
            .expect("scripted model ran out of responses");
        async move { next }
    }
}

// Reference impl so a test can keep the model for request assertions after
// moving a borrow into the service.
impl ChatModel for &ScriptedModel {
    fn chat(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatCompletion, LlmError>> + Send {
        <ScriptedModel as ChatModel>::chat(self, request)
    }
}

/// A completion consisting of one plain assistant text message.
#[must_use]
pub fn text_completion(content: &str) -> ChatCompletion {
    ChatCompletion {
        id: None,
        model: None,
        choices: vec![Choice {
            message: ChatMessage::assistant(content),
            finish_reason: Some("stop".to_string()),
        }],
        usage: None,
    }
}

/// A completion requesting a single tool call.
#[must_use]
pub fn tool_call_completion(name: &str, arguments: &str) -> ChatCompletion {
    ChatCompletion {
        id: None,
        model: None,
        choices: vec![Choice {
            message: ChatMessage {
                role: Role::Assistant,
                content: None,
                tool_calls: Some(vec![ToolCall {
                    id: format!("call_{name}"),
                    call_type: "function".to_string(),
                    function: FunctionCall {
                        name: name.to_string(),
                        arguments: arguments.to_string(),
                    },
                }]),
                tool_call_id: None,
            },
            finish_reason: Some("tool_calls".to_string()),
        }],
        usage: None,
    }
}

/// Build one fixture product.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn product(
    id: i32,
    name: &str,
    category: &str,
    subcategory: &str,
    price: &str,
    rating: f32,
    reviews: u32,
    colors: &[&str],
    sizes: &[&str],
    tags: &[&str],
    in_stock: bool,
) -> Product {
    let price: Decimal = price.parse().expect("fixture price");
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        subcategory: subcategory.to_string(),
        price,
        original_price: price,
        discount: 0,
        rating,
        reviews,
        colors: colors.iter().map(ToString::to_string).collect(),
        sizes: sizes.iter().map(ToString::to_string).collect(),
        tags: tags.iter().map(ToString::to_string).collect(),
        description: format!("A great {name} for every occasion."),
        in_stock,
    }
}

/// The shared store catalog used across integration tests.
#[must_use]
pub fn fixture_catalog() -> Catalog {
    Catalog::new(vec![
        product(
            1,
            "Classic Linen Blazer",
            "Clothing",
            "Blazers",
            "89.99",
            4.5,
            128,
            &["Navy Blue", "Beige"],
            &["S", "M", "L"],
            &["formal", "linen", "summer"],
            true,
        ),
        product(
            2,
            "Organic Cotton T-Shirt",
            "Clothing",
            "Tops",
            "24.99",
            4.3,
            412,
            &["White", "Black"],
            &["S", "M", "L", "XL"],
            &["basic", "casual", "everyday"],
            true,
        ),
        product(
            3,
            "Leather Loafers",
            "Shoes",
            "Loafers",
            "120.00",
            4.8,
            86,
            &["Brown", "Black"],
            &["8", "9", "10"],
            &["leather", "formal"],
            true,
        ),
        product(
            4,
            "Running Sneakers",
            "Shoes",
            "Sneakers",
            "95.00",
            4.4,
            97,
            &["White", "Coral"],
            &["7", "8", "9", "10"],
            &["running", "sports"],
            true,
        ),
        product(
            5,
            "Suede Ankle Boots",
            "Shoes",
            "Boots",
            "135.00",
            4.5,
            153,
            &["Tan", "Black"],
            &["6", "7", "8"],
            &["suede", "fall"],
            false,
        ),
        product(
            6,
            "Minimalist Backpack",
            "Accessories",
            "Bags",
            "65.00",
            4.2,
            210,
            &["Black", "Gray"],
            &["One Size"],
            &["laptop", "travel", "bag"],
            true,
        ),
        product(
            7,
            "Cashmere Scarf",
            "Accessories",
            "Scarves",
            "89.00",
            4.9,
            75,
            &["Cream", "Burgundy"],
            &["One Size"],
            &["winter", "warm", "cashmere", "gift"],
            true,
        ),
        product(
            8,
            "Wireless Headphones",
            "Electronics",
            "Audio",
            "199.00",
            4.6,
            340,
            &["Black", "White"],
            &["One Size"],
            &["audio", "wireless", "tech", "gift"],
            true,
        ),
    ])
}
