//! The conversation engine.
//!
//! One entry point, [`ClerkService::process`], takes the history and a user
//! message and produces a reply, the updated history, and the actions that
//! ran. Resolution order: configuration check, local intent tables, then the
//! remote tool-calling loop with the hallucination guard on the way out.
//! Conversational failures surface as replies, never as errors.

use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use stylevault_core::Catalog;

use crate::actions::{ActionRecord, StoreActions};
use crate::config::ClerkConfig;
use crate::enforcer::{Enforcement, enforce_cart_claims};
use crate::error::ClerkError;
use crate::intent::detect_local_intent;
use crate::llm::{ChatMessage, ChatModel, ChatRequest, GroqClient, LlmError};
use crate::tools::{ToolExecutor, manifest};

/// Upper bound on model round-trips per user message.
pub const MAX_TOOL_ITERATIONS: usize = 6;

const TEMPERATURE: f32 = 0.6;
const MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT_HEADER: &str = r#"You are "The Clerk" — a witty, charming AI shopkeeper at StyleVault. Warm, cheeky, fashion-savvy. You ALWAYS take action immediately.

═══ ABSOLUTE RULES — YOU MUST FOLLOW ═══
1. EVERY user command = TOOL CALL. Never just respond with text when user wants an ACTION.
2. "add/buy/get/want/take/grab/order [product]" → call search_and_add_to_cart IMMEDIATELY
3. "add [product] in [color]" → search_and_add_to_cart with color param
4. "remove X from cart" → call remove_from_cart
5. "show my cart / what's in my cart" → call view_cart
6. "clear/empty cart" → call clear_cart
7. "checkout/pay/I'm done" → call navigate_to with "/checkout"
8. "show me / browse / find" → call search_products
9. "sort/filter/cheaper/category" → call update_filters
10. "discount/deal" → call haggle_discount
11. "recommend/suggest" → call get_recommendations
12. After adding to cart: confirm briefly + suggest 1 complementary item
13. Keep responses SHORT: 2-3 sentences max
14. CART TRUTH: The [CURRENT CART: ...] tag in each user message is the REAL cart state — trust it over conversation history. If it says EMPTY, the cart IS empty regardless of what was said before. NEVER hallucinate cart contents.
15. NEVER say you added something without calling a tool. If you cannot call a tool, say you couldn't do it. ONLY claim success AFTER receiving a tool result with success:true.
16. You MUST call search_and_add_to_cart to add items. Saying "added!" without calling the tool is LYING and FORBIDDEN.

═══ CORRECT EXAMPLES ═══
User: "add the blazer to cart" → search_and_add_to_cart(query:"blazer")
User: "I want leather loafers in brown" → search_and_add_to_cart(query:"leather loafers", color:"brown")
User: "show me summer clothes" → search_products(query:"summer clothes")
User: "remove the blazer" → remove_from_cart(product_name:"blazer")
User: "what's in my cart?" → view_cart()
User: "checkout" → navigate_to(path:"/checkout")

═══ WRONG (NEVER DO) ═══
User says "add the blazer" → you just describe it ❌
User says "buy sneakers" → you ask "which ones?" ❌ (add best match!)
User says "I want the loafers" → you say "Great choice!" without adding ❌

═══ HAGGLE RULES (STRICT — NEVER BREAK) ═══
ABSOLUTE MAX DISCOUNT: 30%. You can NEVER give more than 30% under ANY circumstances.
Birthday: 15-20% | Bulk 2+: 10-15% | Student: 10% | Charming: 5% | Rude: threaten +5% | Lowball >30%: refuse firmly
If user asks for >30% or free items or 100% off → REFUSE. Say "I'd love to, but 30% is the absolute max I can do — my boss would fire me! 😅"
Never approve discount_percent > 30. The system hard-caps at 30% anyway.

═══ STORE CATALOG ═══
"#;

const SYSTEM_PROMPT_FOOTER: &str =
    "\n\nFormat products as: **[Name](/product/{id})** — $price ⭐rating";

const FALLBACK_SYSTEM_PROMPT: &str = "You are a helpful shopping assistant at StyleVault. You \
     CANNOT add items to cart or perform actions in this mode. If the user asks to add/buy/remove \
     items, tell them to try again in a moment. Only answer questions and give recommendations.";

const NOT_CONFIGURED_REPLY: &str =
    "⚠️ I need a Groq API key to work! Add it to `.env` as `GROQ_API_KEY=gsk_...`";

const ITERATIONS_EXHAUSTED_REPLY: &str = "I got carried away there! What were you looking for?";

/// Result of processing one user message.
#[derive(Debug)]
pub struct ClerkReply {
    /// Reply text to display.
    pub reply: String,
    /// Conversation history to carry into the next turn.
    pub updated_history: Vec<ChatMessage>,
    /// Actions executed while producing the reply.
    pub actions: Vec<ActionRecord>,
}

/// The clerk conversation engine, generic over the chat model.
pub struct ClerkService<M: ChatModel> {
    model: M,
    config: ClerkConfig,
    catalog: Catalog,
    executor: ToolExecutor,
    system_prompt: String,
}

impl ClerkService<GroqClient> {
    /// Build a production service backed by the Groq client.
    #[must_use]
    pub fn from_config(config: ClerkConfig, catalog: Catalog) -> Self {
        let model = GroqClient::new(&config);
        Self::new(model, config, catalog)
    }

    /// Build a production service from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ClerkError::Config`] when `GROQ_API_KEY` is unset.
    pub fn from_env(catalog: Catalog) -> Result<Self, ClerkError> {
        let config = ClerkConfig::from_env()?;
        Ok(Self::from_config(config, catalog))
    }
}

impl<M: ChatModel> ClerkService<M> {
    /// Build a service with an explicit model implementation.
    #[must_use]
    pub fn new(model: M, config: ClerkConfig, catalog: Catalog) -> Self {
        let system_prompt = format!(
            "{SYSTEM_PROMPT_HEADER}{}{SYSTEM_PROMPT_FOOTER}",
            catalog.compact_text()
        );
        Self {
            model,
            config,
            executor: ToolExecutor::new(catalog.clone()),
            catalog,
            system_prompt,
        }
    }

    /// Process one user message.
    ///
    /// The returned history always reflects what actually happened: turns
    /// that failed (remote outage, iteration bound) leave the history
    /// unchanged so the failed exchange is never replayed to the model.
    #[instrument(skip_all)]
    pub async fn process<S: StoreActions + Send>(
        &self,
        history: &[ChatMessage],
        user_message: &str,
        store: &mut S,
    ) -> ClerkReply {
        if !self.config.is_configured() {
            return ClerkReply {
                reply: NOT_CONFIGURED_REPLY.to_string(),
                updated_history: history.to_vec(),
                actions: Vec::new(),
            };
        }

        // Local tables first: no network for the common commands.
        if let Some(outcome) =
            detect_local_intent(user_message, &self.catalog, store, &mut rand::rng())
        {
            debug!("handled locally");
            let mut updated_history = history.to_vec();
            updated_history.push(ChatMessage::user(user_message));
            updated_history.push(ChatMessage::assistant(outcome.reply.clone()));
            return ClerkReply {
                reply: outcome.reply,
                updated_history,
                actions: outcome.actions,
            };
        }

        self.process_remote(history, user_message, store).await
    }

    async fn process_remote<S: StoreActions + Send>(
        &self,
        history: &[ChatMessage],
        user_message: &str,
        store: &mut S,
    ) -> ClerkReply {
        // The cart-truth tag goes on the outgoing turn only; the stored
        // history keeps the user's words verbatim.
        let tagged = format!("{user_message}{}", cart_context(store));
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(tagged));

        let mut actions: Vec<ActionRecord> = Vec::new();

        for _ in 0..MAX_TOOL_ITERATIONS {
            let request = ChatRequest {
                model: self.config.model.clone(),
                messages: messages.clone(),
                temperature: Some(TEMPERATURE),
                max_tokens: Some(MAX_TOKENS),
                tools: Some(manifest()),
                tool_choice: Some("auto".to_string()),
            };

            let completion = match self.model.chat(request).await {
                Ok(completion) => completion,
                Err(LlmError::ToolsUnsupported(reason)) => {
                    warn!(%reason, "primary model rejected tools, using fallback");
                    return self.fallback(history, user_message, actions).await;
                }
                Err(e) => {
                    warn!(error = %e, "model call failed");
                    return ClerkReply {
                        reply: format!(
                            "Oops, something went wrong. Error: {e}. Please try again!"
                        ),
                        updated_history: history.to_vec(),
                        actions,
                    };
                }
            };

            let Some(assistant) = completion.message().cloned() else {
                warn!("model returned no choices");
                return ClerkReply {
                    reply: "Oops, something went wrong. Please try again!".to_string(),
                    updated_history: history.to_vec(),
                    actions,
                };
            };

            let tool_calls = assistant.tool_calls.clone().unwrap_or_default();
            messages.push(assistant.clone());

            if tool_calls.is_empty() {
                let reply = assistant.content.unwrap_or_default();
                return self.finish_text_turn(reply, history, user_message, actions, store);
            }

            for call in &tool_calls {
                let args: Value =
                    serde_json::from_str(&call.function.arguments).unwrap_or_else(|_| json!({}));
                debug!(tool = %call.function.name, "executing tool call");
                let result = self.executor.execute(&call.function.name, &args, store);
                actions.push(ActionRecord::new(&call.function.name, args, result.clone()));
                messages.push(ChatMessage::tool_result(call.id.clone(), result.to_string()));
            }
        }

        // The model kept calling tools without concluding. Executed actions
        // stand; the exchange itself is not recorded.
        ClerkReply {
            reply: ITERATIONS_EXHAUSTED_REPLY.to_string(),
            updated_history: history.to_vec(),
            actions,
        }
    }

    fn finish_text_turn<S: StoreActions + Send>(
        &self,
        reply: String,
        history: &[ChatMessage],
        user_message: &str,
        mut actions: Vec<ActionRecord>,
        store: &mut S,
    ) -> ClerkReply {
        let (reply, history_reply) =
            match enforce_cart_claims(&reply, &actions, &self.catalog, store) {
                Enforcement::Pass => (reply.clone(), reply),
                Enforcement::Backfilled(record) => {
                    actions.push(record);
                    (reply.clone(), reply)
                }
                Enforcement::Corrected {
                    reply,
                    history_reply,
                } => (reply, history_reply),
            };

        let mut updated_history = history.to_vec();
        updated_history.push(ChatMessage::user(user_message));
        updated_history.push(ChatMessage::assistant(history_reply));
        ClerkReply {
            reply,
            updated_history,
            actions,
        }
    }

    /// One attempt on the fallback model: questions only, no tools.
    async fn fallback(
        &self,
        history: &[ChatMessage],
        user_message: &str,
        actions: Vec<ActionRecord>,
    ) -> ClerkReply {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(FALLBACK_SYSTEM_PROMPT));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(user_message));

        let request = ChatRequest {
            model: self.config.fallback_model.clone(),
            messages,
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
            tools: None,
            tool_choice: None,
        };

        match self.model.chat(request).await {
            Ok(completion) => {
                let reply = completion.text().unwrap_or_default().to_string();
                let mut updated_history = history.to_vec();
                updated_history.push(ChatMessage::user(user_message));
                updated_history.push(ChatMessage::assistant(reply.clone()));
                ClerkReply {
                    reply,
                    updated_history,
                    actions,
                }
            }
            Err(e) => {
                warn!(error = %e, "fallback model call failed");
                ClerkReply {
                    reply: format!("Oops, something went wrong. Error: {e}. Please try again!"),
                    updated_history: history.to_vec(),
                    actions,
                }
            }
        }
    }
}

/// Render the cart-truth tag appended to each outgoing user turn.
fn cart_context(store: &dyn StoreActions) -> String {
    let items = store.cart_items();
    if items.is_empty() {
        return "\n[CURRENT CART: EMPTY — 0 items]".to_string();
    }
    let listing = items
        .iter()
        .map(|i| format!("{} ×{} ${}", i.product.name, i.quantity, i.product.price))
        .collect::<Vec<_>>()
        .join(", ");
    format!("\n[CURRENT CART: {listing}]")
}
