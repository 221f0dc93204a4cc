//! Helpers around chat-completions APIs: image encoding, plain/JSON/tool
//! response fetching, and tool schema generation from callable descriptions.

pub mod commands;
pub mod config;
pub mod llm;
pub mod logging;
pub mod schema;
pub mod vision;

pub use llm::{
    ChatCompletions, ChatMessage, CompletionError, HttpChatClient, JsonOptions, TextOptions,
    get_json_response, get_response_with_tools, get_text_response,
};
pub use schema::{FunctionDescriptor, Introspect, SchemaError, ToolSchema, generate_schema};
pub use vision::encode_image;
