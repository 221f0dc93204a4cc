use std::env;

use reqwest::blocking::Client;
use tracing::debug;

use crate::llm::provider::{Provider, UpstreamError, api_key_env, endpoint};
use crate::llm::types::{ChatCompletionRequest, ChatCompletionResponse};

/// Anything that can run one chat-completions call.
///
/// Implementations send exactly one request per call and return failures
/// as-is; there is no retry layer.
pub trait ChatCompletions {
    fn create(&self, request: &ChatCompletionRequest)
    -> Result<ChatCompletionResponse, UpstreamError>;
}

impl<T: ChatCompletions + ?Sized> ChatCompletions for &T {
    fn create(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, UpstreamError> {
        (**self).create(request)
    }
}

/// Blocking chat-completions client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl HttpChatClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    /// Creates a client for `provider`, reading its API key from the environment.
    pub fn from_env(provider: Provider) -> Result<Self, UpstreamError> {
        let key_env = api_key_env(provider);
        let api_key = env::var(key_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(UpstreamError::MissingApiKey { key_env })?;
        Ok(Self::new(endpoint(provider), api_key))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ChatCompletions for HttpChatClient {
    fn create(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, UpstreamError> {
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            timeout = ?request.timeout,
            "sending chat completion request"
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().map_err(|source| UpstreamError::Request {
            endpoint: self.endpoint.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
            debug!(%status, "chat completion request rejected");
            return Err(UpstreamError::Api { status, body });
        }

        let body = response.text().map_err(|source| UpstreamError::Request {
            endpoint: self.endpoint.clone(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|err| UpstreamError::Decode(err.to_string()))
    }
}
