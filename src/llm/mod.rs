//! Chat-completions plumbing.
//!
//! Wire types, the [`client::ChatCompletions`] seam with its blocking HTTP
//! implementation, and the one-call response helpers built on top of it.

/// Blocking chat-completions client and the trait it implements.
pub mod client;
/// Plain, JSON-constrained and tool-calling response helpers.
pub mod completions;
/// Provider endpoints, API key lookup and upstream errors.
pub mod provider;
/// Request and response wire types.
pub mod types;

pub use client::{ChatCompletions, HttpChatClient};
pub use completions::{
    CompletionError, JsonOptions, TextOptions, get_json_response, get_response_with_tools,
    get_text_response,
};
pub use provider::{Provider, UpstreamError};
pub use types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, ToolCall};
