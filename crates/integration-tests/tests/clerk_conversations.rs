//! End-to-end conversation tests for the clerk engine.
//!
//! Each test drives [`ClerkService::process`] with a scripted model and a
//! real in-memory cart, asserting on the reply, the history, the action log,
//! and the resulting store state.

use stylevault_clerk::llm::{ChatMessage, LlmError};
use stylevault_clerk::{
    ClerkConfig, ClerkService, MAX_TOOL_ITERATIONS, MemoryCart, StoreActions,
};
use stylevault_integration_tests::{
    ScriptedModel, fixture_catalog, text_completion, tool_call_completion,
};

fn service(model: &ScriptedModel) -> ClerkService<&ScriptedModel> {
    ClerkService::new(model, ClerkConfig::new("gsk_test"), fixture_catalog())
}

// =============================================================================
// Local resolution
// =============================================================================

#[tokio::test]
async fn test_local_add_with_color_size_and_quantity() {
    let model = ScriptedModel::new(vec![]);
    let svc = service(&model);
    let mut cart = MemoryCart::new();

    let result = svc
        .process(&[], "add 2 navy linen blazers size M", &mut cart)
        .await;

    let items = cart.cart_items();
    assert_eq!(items.len(), 1);
    let line = items.first().expect("cart line");
    assert_eq!(line.product.name, "Classic Linen Blazer");
    assert_eq!(line.selected_color, "Navy Blue");
    assert_eq!(line.selected_size, "M");
    assert_eq!(line.quantity, 2);
    assert!(result.reply.contains("Classic Linen Blazer"));
    // No model call happened.
    assert!(model.requests().is_empty());
}

#[tokio::test]
async fn test_repeated_add_merges_into_one_line() {
    let model = ScriptedModel::new(vec![]);
    let svc = service(&model);
    let mut cart = MemoryCart::new();
    let mut history: Vec<ChatMessage> = Vec::new();

    for _ in 0..2 {
        let result = svc
            .process(&history, "add the leather loafers", &mut cart)
            .await;
        history = result.updated_history;
    }

    let items = cart.cart_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().map(|l| l.quantity), Some(2));
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn test_local_checkout_navigates() {
    let model = ScriptedModel::new(vec![]);
    let svc = service(&model);
    let mut cart = MemoryCart::new();

    let result = svc.process(&[], "checkout", &mut cart).await;
    assert_eq!(cart.current_path.as_deref(), Some("/checkout"));
    assert!(result.reply.contains("checkout"));
}

// =============================================================================
// Remote tool loop
// =============================================================================

#[tokio::test]
async fn test_remote_add_flows_through_executor() {
    let model = ScriptedModel::new(vec![
        Ok(tool_call_completion(
            "search_and_add_to_cart",
            r#"{"query": "cashmere scarf", "quantity": 1}"#,
        )),
        Ok(text_completion(
            "Done! ✅ Added **Cashmere Scarf** to your cart.",
        )),
    ]);
    let svc = service(&model);
    let mut cart = MemoryCart::new();

    let result = svc
        .process(&[], "hmm, something warm for my mum maybe?", &mut cart)
        .await;

    assert_eq!(cart.cart_items().len(), 1);
    assert_eq!(result.actions.len(), 1);
    assert_eq!(
        result.actions.first().map(|a| a.function.as_str()),
        Some("search_and_add_to_cart")
    );
    // Tool result went back to the model on the second request.
    let requests = model.requests();
    let second = requests.get(1).expect("second request");
    let tool_msg = second.messages.last().expect("tool message");
    assert!(
        tool_msg
            .content
            .as_deref()
            .is_some_and(|c| c.contains("\"success\":true"))
    );
}

#[tokio::test]
async fn test_outgoing_turn_carries_cart_truth_tag() {
    let model = ScriptedModel::new(vec![Ok(text_completion("Lovely choice earlier!"))]);
    let svc = service(&model);
    let mut cart = MemoryCart::new();

    // Seed the cart locally, then send small talk that goes remote.
    let first = svc.process(&[], "add the leather loafers", &mut cart).await;
    svc.process(&first.updated_history, "how are you today?", &mut cart)
        .await;

    let requests = model.requests();
    let outgoing = requests
        .first()
        .and_then(|r| r.messages.last())
        .and_then(|m| m.content.as_deref())
        .expect("outgoing turn");
    assert!(outgoing.starts_with("how are you today?"));
    assert!(outgoing.contains("[CURRENT CART: Leather Loafers ×1 $120.00]"));
    // The stored history keeps the plain text.
    assert!(
        requests
            .first()
            .map(|r| r.messages.iter().all(|m| {
                m.content
                    .as_deref()
                    .is_none_or(|c| !c.contains("add the leather loafers\n[CURRENT CART"))
            }))
            .expect("request")
    );
}

#[tokio::test]
async fn test_haggle_is_clamped_end_to_end() {
    let model = ScriptedModel::new(vec![
        Ok(tool_call_completion(
            "haggle_discount",
            r#"{"approved": true, "discount_percent": 50, "coupon_code": "BDAY-50", "reason": "birthday"}"#,
        )),
        Ok(text_completion("Happy birthday! That's my absolute max! 🎉")),
    ]);
    let svc = service(&model);
    let mut cart = MemoryCart::new();
    cart.add_to_cart(
        fixture_catalog().get(3.into()).expect("loafers"),
        "Brown",
        "9",
        1,
    );

    let result = svc
        .process(&[], "it's my birthday, give me 50% off!", &mut cart)
        .await;

    assert_eq!(
        cart.coupon().map(stylevault_core::Coupon::discount_percent),
        Some(30)
    );
    let record = result.actions.first().expect("haggle action");
    assert_eq!(record.result["discount"], 30);
}

// =============================================================================
// Hallucination guard
// =============================================================================

#[tokio::test]
async fn test_unbacked_add_claim_is_made_true() {
    let model = ScriptedModel::new(vec![Ok(text_completion(
        "Done! Added **Wireless Headphones** to your cart! 🎧",
    ))]);
    let svc = service(&model);
    let mut cart = MemoryCart::new();

    let result = svc.process(&[], "sort me out with audio", &mut cart).await;

    assert_eq!(cart.cart_items().len(), 1);
    assert_eq!(
        cart.cart_items().first().map(|l| l.product.name.clone()),
        Some("Wireless Headphones".to_string())
    );
    assert_eq!(result.actions.len(), 1);
    // The reply stands because the claim was made true.
    assert!(result.reply.contains("Wireless Headphones"));
}

#[tokio::test]
async fn test_unbacked_add_claim_of_unknown_product_is_corrected() {
    let model = ScriptedModel::new(vec![Ok(text_completion(
        "Added the Diamond Crown to your cart, your majesty!",
    ))]);
    let svc = service(&model);
    let mut cart = MemoryCart::new();

    let result = svc.process(&[], "something royal please", &mut cart).await;

    assert!(cart.cart_items().is_empty());
    assert!(result.reply.contains("couldn't actually find"));
    // The corrected exchange is still recorded.
    assert_eq!(result.updated_history.len(), 2);
}

// =============================================================================
// Degraded paths
// =============================================================================

#[tokio::test]
async fn test_missing_api_key_short_circuits() {
    let model = ScriptedModel::new(vec![]);
    let svc = ClerkService::new(&model, ClerkConfig::new(""), fixture_catalog());
    let mut cart = MemoryCart::new();

    let result = svc.process(&[], "add the blazer", &mut cart).await;

    assert!(result.reply.contains("Groq API key"));
    assert!(cart.cart_items().is_empty());
    assert!(model.requests().is_empty());
}

#[tokio::test]
async fn test_tools_unsupported_retries_on_fallback_model() {
    let model = ScriptedModel::new(vec![
        Err(LlmError::ToolsUnsupported("tools rejected".to_string())),
        Ok(text_completion("Cashmere is wonderfully warm for winter.")),
    ]);
    let svc = service(&model);
    let mut cart = MemoryCart::new();

    let result = svc
        .process(&[], "is cashmere warm enough for winter?", &mut cart)
        .await;

    assert_eq!(result.reply, "Cashmere is wonderfully warm for winter.");
    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    let fallback = requests.get(1).expect("fallback request");
    assert!(fallback.tools.is_none());
    assert_ne!(fallback.model, requests.first().expect("primary").model);
}

#[tokio::test]
async fn test_model_outage_keeps_history_intact() {
    let model = ScriptedModel::new(vec![Err(LlmError::RateLimited(60))]);
    let svc = service(&model);
    let mut cart = MemoryCart::new();
    let history = vec![
        ChatMessage::user("hello"),
        ChatMessage::assistant("Welcome to StyleVault!"),
    ];

    let result = svc
        .process(&history, "what's trendy right now?", &mut cart)
        .await;

    assert!(result.reply.contains("Oops"));
    assert_eq!(result.updated_history.len(), 2);
}

#[tokio::test]
async fn test_runaway_tool_loop_is_bounded() {
    let script = (0..MAX_TOOL_ITERATIONS)
        .map(|_| Ok(tool_call_completion("view_cart", "{}")))
        .collect();
    let model = ScriptedModel::new(script);
    let svc = service(&model);
    let mut cart = MemoryCart::new();

    let result = svc.process(&[], "tell me about my options", &mut cart).await;

    assert_eq!(model.requests().len(), MAX_TOOL_ITERATIONS);
    assert_eq!(result.actions.len(), MAX_TOOL_ITERATIONS);
    assert!(result.updated_history.is_empty());
}
