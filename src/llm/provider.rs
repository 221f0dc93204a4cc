use std::env;
use std::str::FromStr;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Openai,
    Fireworks,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Fireworks => "fireworks",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::Openai),
            "fireworks" => Ok(Self::Fireworks),
            other => Err(format!(
                "Unsupported provider '{other}'. Supported values: openai, fireworks."
            )),
        }
    }
}

pub fn endpoint(provider: Provider) -> &'static str {
    match provider {
        Provider::Openai => "https://api.openai.com/v1/chat/completions",
        Provider::Fireworks => "https://api.fireworks.ai/inference/v1/chat/completions",
    }
}

pub fn api_key_env(provider: Provider) -> &'static str {
    match provider {
        Provider::Openai => "OPENAI_API_KEY",
        Provider::Fireworks => "FIREWORKS_API_KEY",
    }
}

pub fn is_api_key_present(provider: Provider) -> bool {
    env::var(api_key_env(provider))
        .ok()
        .is_some_and(|value| !value.trim().is_empty())
}

/// Failure reported by the remote completion client. Never retried.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{key_env} is not set in the environment")]
    MissingApiKey { key_env: &'static str },
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("OpenAI".parse::<Provider>(), Ok(Provider::Openai));
        assert_eq!(" fireworks ".parse::<Provider>(), Ok(Provider::Fireworks));
        let err = "bad".parse::<Provider>().unwrap_err();
        assert!(err.contains("Supported values: openai, fireworks."));
    }

    #[test]
    fn provider_endpoints_and_keys_match() {
        assert_eq!(api_key_env(Provider::Openai), "OPENAI_API_KEY");
        assert_eq!(api_key_env(Provider::Fireworks), "FIREWORKS_API_KEY");
        assert!(endpoint(Provider::Fireworks).starts_with("https://api.fireworks.ai/"));
        assert_eq!(Provider::Openai.as_str(), "openai");
    }
}
