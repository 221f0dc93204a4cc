//! One-call helpers over a [`ChatCompletions`] client.
//!
//! Each helper builds a single request, sends it once and reshapes the
//! response. Failures are returned untouched.

use std::time::Duration;

use thiserror::Error;

use crate::llm::client::ChatCompletions;
use crate::llm::provider::UpstreamError;
use crate::llm::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat};
use crate::schema::ToolSchema;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("response did not contain any choices")]
    NoChoices,
    #[error("first choice did not contain message content")]
    MissingContent,
}

/// Sampling options for [`get_text_response`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1024,
            timeout: Duration::from_secs(20),
        }
    }
}

/// Sampling options for [`get_json_response`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsonOptions {
    pub seed: i64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            temperature: 0.0,
            max_tokens: 1024,
            timeout: Duration::from_secs(20),
        }
    }
}

pub fn text_request(
    model: &str,
    messages: &[ChatMessage],
    options: TextOptions,
) -> ChatCompletionRequest {
    let mut request = ChatCompletionRequest::new(model, messages.to_vec());
    request.temperature = Some(options.temperature);
    request.max_tokens = Some(options.max_tokens);
    request.timeout = Some(options.timeout);
    request
}

pub fn json_request(
    model: &str,
    messages: &[ChatMessage],
    options: JsonOptions,
) -> ChatCompletionRequest {
    let mut request = ChatCompletionRequest::new(model, messages.to_vec());
    request.response_format = Some(ResponseFormat::json_object());
    request.seed = Some(options.seed);
    request.temperature = Some(options.temperature);
    request.max_tokens = Some(options.max_tokens);
    request.timeout = Some(options.timeout);
    request
}

/// Tool-calling request. Sampling and timeout are left to the provider.
pub fn tools_request(
    model: &str,
    messages: &[ChatMessage],
    tools: &[ToolSchema],
) -> ChatCompletionRequest {
    let mut request = ChatCompletionRequest::new(model, messages.to_vec());
    request.tools = Some(tools.to_vec());
    request
}

/// Returns the text of the first choice.
pub fn get_text_response<C: ChatCompletions + ?Sized>(
    client: &C,
    model: &str,
    messages: &[ChatMessage],
    options: TextOptions,
) -> Result<String, CompletionError> {
    let response = client.create(&text_request(model, messages, options))?;
    first_content(response)
}

/// Requests a JSON-object response and returns its raw, unparsed text.
pub fn get_json_response<C: ChatCompletions + ?Sized>(
    client: &C,
    model: &str,
    messages: &[ChatMessage],
    options: JsonOptions,
) -> Result<String, CompletionError> {
    let response = client.create(&json_request(model, messages, options))?;
    first_content(response)
}

/// Offers `tools` to the model and returns the full response so the caller
/// can inspect requested tool calls.
pub fn get_response_with_tools<C: ChatCompletions + ?Sized>(
    client: &C,
    model: &str,
    messages: &[ChatMessage],
    tools: &[ToolSchema],
) -> Result<ChatCompletionResponse, CompletionError> {
    Ok(client.create(&tools_request(model, messages, tools))?)
}

fn first_content(response: ChatCompletionResponse) -> Result<String, CompletionError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::NoChoices)?;
    choice.message.content.ok_or(CompletionError::MissingContent)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::llm::types::{AssistantMessage, Choice};
    use crate::schema::{Annotation, FunctionDescriptor, generate_schema};
    use reqwest::StatusCode;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingClient {
        responses: RefCell<VecDeque<Result<ChatCompletionResponse, UpstreamError>>>,
        requests: RefCell<Vec<ChatCompletionRequest>>,
    }

    impl RecordingClient {
        fn replying(response: Result<ChatCompletionResponse, UpstreamError>) -> Self {
            let client = Self::default();
            client.responses.borrow_mut().push_back(response);
            client
        }

        fn sent(&self) -> Vec<ChatCompletionRequest> {
            self.requests.borrow().clone()
        }
    }

    impl ChatCompletions for RecordingClient {
        fn create(
            &self,
            request: &ChatCompletionRequest,
        ) -> Result<ChatCompletionResponse, UpstreamError> {
            self.requests.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(UpstreamError::Decode("no scripted response".to_string())))
        }
    }

    fn reply(content: Option<&str>) -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: Some("chatcmpl-test".to_string()),
            model: Some("test-model".to_string()),
            choices: vec![Choice {
                index: 0,
                message: AssistantMessage {
                    role: None,
                    content: content.map(str::to_string),
                    tool_calls: Vec::new(),
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: None,
        }
    }

    fn empty_reply() -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: None,
            model: None,
            choices: Vec::new(),
            usage: None,
        }
    }

    #[test]
    fn text_response_forwards_defaults_and_returns_first_choice() {
        let client = RecordingClient::replying(Ok(reply(Some("4"))));
        let messages = [ChatMessage::user("2+2?")];

        let text = get_text_response(&client, "gpt-4o-mini", &messages, TextOptions::default())
            .unwrap();
        assert_eq!(text, "4");

        let sent = client.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].model, "gpt-4o-mini");
        assert_eq!(sent[0].messages, messages);
        assert_eq!(sent[0].temperature, Some(0.3));
        assert_eq!(sent[0].max_tokens, Some(1024));
        assert_eq!(sent[0].timeout, Some(Duration::from_secs(20)));
        assert!(sent[0].response_format.is_none());
        assert!(sent[0].tools.is_none());
    }

    #[test]
    fn json_response_sets_format_and_seed_without_parsing() {
        let client = RecordingClient::replying(Ok(reply(Some("{\"answer\": 4"))));
        let raw = get_json_response(
            &client,
            "m",
            &[ChatMessage::user("json please")],
            JsonOptions::default(),
        )
        .unwrap();
        assert_eq!(raw, "{\"answer\": 4");

        let body = serde_json::to_value(&client.sent()[0]).unwrap();
        assert_eq!(body["response_format"], json!({"type": "json_object"}));
        assert_eq!(body["seed"], 42);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["max_tokens"], 1024);
        assert!(body.get("timeout").is_none());
    }

    #[test]
    fn custom_options_are_forwarded_verbatim() {
        let client = RecordingClient::replying(Ok(reply(Some("ok"))));
        let options = TextOptions {
            temperature: 0.9,
            max_tokens: 16,
            timeout: Duration::from_secs(3),
        };
        get_text_response(&client, "m", &[ChatMessage::user("x")], options).unwrap();
        let sent = &client.sent()[0];
        assert_eq!(sent.temperature, Some(0.9));
        assert_eq!(sent.max_tokens, Some(16));
        assert_eq!(sent.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn tools_response_returns_raw_response() {
        let tool = generate_schema(
            &FunctionDescriptor::new("get_weather").param("city", Annotation::Text),
        )
        .unwrap();
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_weather", "arguments": "{\"city\":\"Paris\"}"}
                    }]
                }
            }]
        }))
        .unwrap();
        let client = RecordingClient::replying(Ok(response.clone()));

        let got = get_response_with_tools(
            &client,
            "m",
            &[ChatMessage::user("weather?")],
            std::slice::from_ref(&tool),
        )
        .unwrap();
        assert_eq!(got, response);
        assert_eq!(got.tool_calls()[0].function.name, "get_weather");

        let sent = &client.sent()[0];
        assert_eq!(sent.tools.as_deref(), Some(std::slice::from_ref(&tool)));
        assert!(sent.temperature.is_none());
        assert!(sent.max_tokens.is_none());
        assert!(sent.timeout.is_none());
    }

    #[test]
    fn empty_choices_is_reported() {
        let client = RecordingClient::replying(Ok(empty_reply()));
        let err = get_text_response(&client, "m", &[], TextOptions::default()).unwrap_err();
        assert!(matches!(err, CompletionError::NoChoices));
    }

    #[test]
    fn null_content_is_reported() {
        let client = RecordingClient::replying(Ok(reply(None)));
        let err = get_json_response(&client, "m", &[], JsonOptions::default()).unwrap_err();
        assert!(matches!(err, CompletionError::MissingContent));
    }

    #[test]
    fn upstream_errors_pass_through_after_one_attempt() {
        let client = RecordingClient::replying(Err(UpstreamError::Api {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "slow down".to_string(),
        }));
        let err = get_text_response(&client, "m", &[], TextOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "API error 429 Too Many Requests: slow down");
        assert!(matches!(
            err,
            CompletionError::Upstream(UpstreamError::Api { .. })
        ));
        assert_eq!(client.sent().len(), 1);
    }

    #[test]
    fn tools_call_surfaces_upstream_errors() {
        let client = RecordingClient::default();
        let err = get_response_with_tools(&client, "m", &[], &[]).unwrap_err();
        assert!(matches!(err, CompletionError::Upstream(_)));
    }
}
