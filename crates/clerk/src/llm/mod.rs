//! Chat-completion protocol layer.
//!
//! Wire types for OpenAI-compatible chat completions, the Groq HTTP client,
//! and the [`ChatModel`] seam the conversation engine is generic over, so
//! tests can script completions without a network.

mod client;
mod error;
mod types;

pub use client::GroqClient;
pub use error::LlmError;
pub use types::{
    ChatCompletion, ChatMessage, ChatRequest, Choice, FunctionCall, FunctionDef, Role, ToolCall,
    ToolDef, Usage,
};

/// A model that can answer chat requests.
///
/// Implemented by [`GroqClient`] for production and by scripted doubles in
/// tests.
pub trait ChatModel: Send + Sync {
    /// Answer one chat request.
    fn chat(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatCompletion, LlmError>> + Send;
}
