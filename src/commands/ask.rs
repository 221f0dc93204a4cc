use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use serde_json::json;
use tracing::debug;

use crate::config::{self, ProfileConfig};
use crate::llm::completions::{self, JsonOptions, TextOptions};
use crate::llm::provider::{self, Provider};
use crate::llm::{ChatCompletionRequest, ChatMessage, ContentPart, HttpChatClient};
use crate::logging;
use crate::schema::{self, ToolSchema};
use crate::vision;

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    /// Provider to call (openai, fireworks). Falls back to FNKIT_PROVIDER.
    #[arg(long)]
    pub provider: Option<String>,
    /// Model id. Falls back to FNKIT_MODEL.
    #[arg(long)]
    pub model: Option<String>,
    /// Profile name from the config file.
    #[arg(long)]
    pub profile: Option<String>,
    /// Optional system message.
    #[arg(long)]
    pub system: Option<String>,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Seed for JSON mode.
    #[arg(long)]
    pub seed: Option<i64>,
    /// Ask for a JSON object response.
    #[arg(long, conflicts_with = "tools")]
    pub json: bool,
    /// Tool descriptor file (TOML or JSON); prints the raw response.
    /// Tool calls send no sampling or timeout settings.
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["temperature", "max_tokens", "timeout", "seed"]
    )]
    pub tools: Option<PathBuf>,
    /// Attach an image to the user message.
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,
    /// Print the request instead of sending it.
    #[arg(long)]
    pub dry_run: bool,
    #[arg(short, long)]
    pub verbose: bool,
    #[arg(short, long)]
    pub quiet: bool,
    /// Prompt text. Read from stdin when omitted.
    pub prompt: Option<String>,
}

enum Mode {
    Text(TextOptions),
    Json(JsonOptions),
    Tools(Vec<ToolSchema>),
}

impl Mode {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Json(_) => "json",
            Self::Tools(_) => "tools",
        }
    }

    fn request(&self, model: &str, messages: &[ChatMessage]) -> ChatCompletionRequest {
        match self {
            Self::Text(options) => completions::text_request(model, messages, *options),
            Self::Json(options) => completions::json_request(model, messages, *options),
            Self::Tools(tools) => completions::tools_request(model, messages, tools),
        }
    }
}

pub fn run(args: AskArgs) -> Result<(), String> {
    logging::init(args.verbose, args.quiet);

    let profile = match &args.profile {
        Some(name) => config::load_profile(name).map_err(|err| err.to_string())?,
        None => ProfileConfig::default(),
    };

    let provider = resolve_provider(args.provider.as_deref(), &profile)?;
    let model = args
        .model
        .clone()
        .or_else(|| env_value("FNKIT_MODEL"))
        .or_else(|| profile.model.clone())
        .ok_or_else(|| "No model provided. Use --model or set FNKIT_MODEL.".to_string())?;

    let prompt = read_prompt(args.prompt.clone())?;
    let messages = build_messages(&args, &profile, prompt)?;
    let mode = resolve_mode(&args, &profile)?;
    let request = mode.request(&model, &messages);

    debug!(
        provider = provider.as_str(),
        model = %model,
        mode = mode.as_str(),
        api_key_present = provider::is_api_key_present(provider),
        "resolved ask request"
    );

    if args.dry_run {
        let body = json!({
            "dry_run": true,
            "provider": provider.as_str(),
            "endpoint": provider::endpoint(provider),
            "mode": mode.as_str(),
            "timeout_secs": request.timeout.map(|timeout| timeout.as_secs()),
            "request": request,
        });
        println!("{body}");
        return Ok(());
    }

    let client = HttpChatClient::from_env(provider).map_err(|err| err.to_string())?;
    match mode {
        Mode::Text(options) => {
            let text = completions::get_text_response(&client, &model, &messages, options)
                .map_err(|err| err.to_string())?;
            println!("{text}");
        }
        Mode::Json(options) => {
            let raw = completions::get_json_response(&client, &model, &messages, options)
                .map_err(|err| err.to_string())?;
            println!("{raw}");
        }
        Mode::Tools(tools) => {
            let response =
                completions::get_response_with_tools(&client, &model, &messages, &tools)
                    .map_err(|err| err.to_string())?;
            let rendered = serde_json::to_string_pretty(&response)
                .map_err(|err| format!("Failed to render response: {err}"))?;
            println!("{rendered}");
        }
    }
    Ok(())
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn resolve_provider(flag: Option<&str>, profile: &ProfileConfig) -> Result<Provider, String> {
    if let Some(value) = flag {
        return value.parse();
    }
    if let Some(value) = env_value("FNKIT_PROVIDER") {
        return value.parse().map_err(|_| {
            format!("Invalid FNKIT_PROVIDER '{value}'. Supported values: openai, fireworks.")
        });
    }
    match &profile.provider {
        Some(value) => value.parse(),
        None => Ok(Provider::Openai),
    }
}

fn read_prompt(argument: Option<String>) -> Result<String, String> {
    if let Some(prompt) = argument {
        return Ok(prompt);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err("No prompt provided. Pass it as an argument or via stdin.".to_string());
    }

    let mut buffer = String::new();
    stdin
        .lock()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("Failed to read prompt from stdin: {err}"))?;
    let prompt = buffer.trim().to_string();
    if prompt.is_empty() {
        return Err("No prompt provided. Pass it as an argument or via stdin.".to_string());
    }
    Ok(prompt)
}

fn build_messages(
    args: &AskArgs,
    profile: &ProfileConfig,
    prompt: String,
) -> Result<Vec<ChatMessage>, String> {
    let mut messages = Vec::new();
    if let Some(system) = args.system.as_ref().or(profile.system.as_ref()) {
        messages.push(ChatMessage::system(system.clone()));
    }

    match &args.image {
        Some(path) => {
            let url = vision::image_data_url(path)
                .map_err(|err| format!("Failed to read image '{}': {err}", path.display()))?;
            messages.push(ChatMessage::user_parts(vec![
                ContentPart::text(prompt),
                ContentPart::image_url(url),
            ]));
        }
        None => messages.push(ChatMessage::user(prompt)),
    }
    Ok(messages)
}

fn resolve_mode(args: &AskArgs, profile: &ProfileConfig) -> Result<Mode, String> {
    if let Some(path) = &args.tools {
        let set = schema::load_tool_set(path).map_err(|err| err.to_string())?;
        let tools = schema::generate_schemas(&set.functions).map_err(|err| err.to_string())?;
        return Ok(Mode::Tools(tools));
    }

    let temperature = args.temperature.or(profile.temperature);
    let max_tokens = args.max_tokens.or(profile.max_tokens);
    let timeout = args.timeout.or(profile.timeout).map(Duration::from_secs);

    if args.json {
        let defaults = JsonOptions::default();
        return Ok(Mode::Json(JsonOptions {
            seed: args.seed.or(profile.seed).unwrap_or(defaults.seed),
            temperature: temperature.unwrap_or(defaults.temperature),
            max_tokens: max_tokens.unwrap_or(defaults.max_tokens),
            timeout: timeout.unwrap_or(defaults.timeout),
        }));
    }

    let defaults = TextOptions::default();
    Ok(Mode::Text(TextOptions {
        temperature: temperature.unwrap_or(defaults.temperature),
        max_tokens: max_tokens.unwrap_or(defaults.max_tokens),
        timeout: timeout.unwrap_or(defaults.timeout),
    }))
}
