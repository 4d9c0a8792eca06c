use crate::report::error::ProviderError;
use crate::report::render::PromptPair;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const REQUEST_TIMEOUT_DURATION: Duration = Duration::from_secs(60);

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai";

/// Attribution headers OpenRouter expects from client apps
const OPENROUTER_REFERER: &str = "http://localhost:8501";
const OPENROUTER_TITLE: &str = "Exec Report Generator";

/// Free OpenRouter models offered by default
pub const OPENROUTER_MODELS: [&str; 4] = [
    "google/gemma-2-9b-it:free",
    "meta-llama/llama-3.1-8b-instruct:free",
    "nousresearch/hermes-2-pro-llama-3-8b:free",
    "neversleep/noromaid-mixtral-8x7b-instruct:free",
];

// Generic structure for OpenAI-compatible API chat messages
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

// OpenRouter chat request
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
pub struct Choice {
    pub message: MessageContent,
}

#[derive(Deserialize, Debug)]
pub struct MessageContent {
    pub content: String,
}

// Gemini request: one combined prompt plus a generation config
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Deserialize, Debug)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize, Debug)]
pub struct GeminiCandidate {
    pub content: GeminiContent,
}

/// LLM Provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    /// Render the prompt only, never call an API
    #[default]
    Preview,
    Gemini,
    OpenRouter,
}

impl LLMProvider {
    /// Helper to get provider name for logging and errors
    pub fn name(&self) -> &'static str {
        match self {
            LLMProvider::Preview => "Preview",
            LLMProvider::Gemini => "Gemini",
            LLMProvider::OpenRouter => "OpenRouter",
        }
    }

    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            LLMProvider::Preview => "preview",
            LLMProvider::Gemini => "gemini-1.5-flash",
            LLMProvider::OpenRouter => OPENROUTER_MODELS[0],
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LLMProvider::Preview => None,
            LLMProvider::Gemini => Some("GEMINI_API_KEY"),
            LLMProvider::OpenRouter => Some("OPENROUTER_API_KEY"),
        }
    }
}

impl FromStr for LLMProvider {
    type Err = String;

    /// Parse provider from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "preview" | "none" => Ok(Self::Preview),
            "gemini" => Ok(Self::Gemini),
            "openrouter" => Ok(Self::OpenRouter),
            _ => Err(format!("Unsupported LLM provider: {}", s)),
        }
    }
}

impl fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Generation parameters for a single request
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_key: Option<String>,
    /// Log request payloads and raw responses
    pub debug: bool,
}

/// A text-generation backend
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate report text for a prompt pair
    async fn generate(
        &self,
        prompt: &PromptPair,
        params: &GenerationParams,
    ) -> Result<String, ProviderError>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Gemini takes a single prompt string, so the pair is folded into one
pub fn gemini_prompt(prompt: &PromptPair) -> String {
    format!("System:\n{}\n\nUser:\n{}", prompt.system, prompt.user)
}

pub fn gemini_request(prompt: &PromptPair, params: &GenerationParams) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: gemini_prompt(prompt),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: params.temperature,
            max_output_tokens: params.max_tokens,
        },
    }
}

pub fn openrouter_request(prompt: &PromptPair, params: &GenerationParams) -> ChatRequest {
    ChatRequest {
        model: params.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: prompt.system.clone(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: prompt.user.clone(),
            },
        ],
        temperature: params.temperature,
        max_tokens: params.max_tokens,
    }
}

fn require_key<'a>(
    provider: &'static str,
    params: &'a GenerationParams,
) -> Result<&'a str, ProviderError> {
    params
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ProviderError::Unconfigured {
            provider,
            reason: "missing API key".to_string(),
        })
}

fn header_value(provider: &'static str, value: &str) -> Result<header::HeaderValue, ProviderError> {
    value.parse().map_err(|_| ProviderError::Unconfigured {
        provider,
        reason: "API key contains characters not allowed in a header".to_string(),
    })
}

/// POST a JSON body once and return the raw response text
async fn post_json<T: Serialize + fmt::Debug>(
    client: &Client,
    provider: &'static str,
    url: &str,
    headers: header::HeaderMap,
    body: &T,
    debug: bool,
) -> Result<String, ProviderError> {
    if debug {
        info!(
            "{} request payload: {}",
            provider,
            serde_json::to_string_pretty(body).unwrap_or_else(|_| format!("{:?}", body))
        );
    }

    let response = client
        .post(url)
        .headers(headers)
        .json(body)
        .timeout(REQUEST_TIMEOUT_DURATION)
        .send()
        .await
        .map_err(|e| ProviderError::Transport {
            provider,
            reason: if e.is_timeout() {
                format!(
                    "request timed out after {} seconds",
                    REQUEST_TIMEOUT_DURATION.as_secs()
                )
            } else {
                e.to_string()
            },
        })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| ProviderError::Transport {
        provider,
        reason: e.to_string(),
    })?;

    if !status.is_success() {
        return Err(ProviderError::Http {
            provider,
            status: status.as_u16(),
            body: text,
        });
    }

    if debug {
        info!("{} raw response: {}", provider, text);
    }

    Ok(text)
}

fn malformed(provider: &'static str, reason: impl Into<String>) -> ProviderError {
    ProviderError::Malformed {
        provider,
        reason: reason.into(),
    }
}

pub struct GeminiProvider {
    client: Client,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, GEMINI_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn generate(
        &self,
        prompt: &PromptPair,
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        let provider = self.provider_name();
        let api_key = require_key(provider, params)?;

        let mut headers = header::HeaderMap::new();
        headers.insert("x-goog-api-key", header_value(provider, api_key)?);

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, params.model
        );
        info!("LLM Request to {}: model={}", provider, params.model);

        let body = gemini_request(prompt, params);
        let raw = post_json(&self.client, provider, &url, headers, &body, params.debug).await?;

        let parsed: GeminiResponse =
            serde_json::from_str(&raw).map_err(|e| malformed(provider, e.to_string()))?;
        let candidate = parsed
            .candidates
            .first()
            .ok_or_else(|| malformed(provider, "no candidates in response"))?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .map(|part| part.text.as_str())
            .collect();

        if text.trim().is_empty() {
            return Err(malformed(provider, "empty candidate text"));
        }

        info!("LLM Response received from {}", provider);
        Ok(text.trim().to_string())
    }

    fn provider_name(&self) -> &'static str {
        LLMProvider::Gemini.name()
    }
}

pub struct OpenRouterProvider {
    client: Client,
    base_url: String,
}

impl OpenRouterProvider {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, OPENROUTER_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GenerationProvider for OpenRouterProvider {
    async fn generate(
        &self,
        prompt: &PromptPair,
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        let provider = self.provider_name();
        let api_key = require_key(provider, params)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header_value(provider, &format!("Bearer {}", api_key))?,
        );
        // Header names must be lowercase for `from_static`
        headers.insert(
            "http-referer",
            header::HeaderValue::from_static(OPENROUTER_REFERER),
        );
        headers.insert("x-title", header::HeaderValue::from_static(OPENROUTER_TITLE));

        let url = format!("{}/api/v1/chat/completions", self.base_url);
        info!("LLM Request to {}: model={}", provider, params.model);

        let body = openrouter_request(prompt, params);
        let raw = post_json(&self.client, provider, &url, headers, &body, params.debug).await?;

        let chat_response: ChatResponse =
            serde_json::from_str(&raw).map_err(|e| malformed(provider, e.to_string()))?;
        let content = chat_response
            .choices
            .first()
            .ok_or_else(|| malformed(provider, "no choices in response"))?
            .message
            .content
            .trim();

        if content.is_empty() {
            return Err(malformed(provider, "empty message content"));
        }

        info!("LLM Response received from {}", provider);
        Ok(content.to_string())
    }

    fn provider_name(&self) -> &'static str {
        LLMProvider::OpenRouter.name()
    }
}

/// Provider implementation for a selection; None for preview mode
pub fn provider_for(provider: LLMProvider, client: Client) -> Option<Box<dyn GenerationProvider>> {
    match provider {
        LLMProvider::Preview => None,
        LLMProvider::Gemini => Some(Box::new(GeminiProvider::new(client))),
        LLMProvider::OpenRouter => Some(Box::new(OpenRouterProvider::new(client))),
    }
}

/// Generates report text with the selected provider, one attempt only
pub async fn generate_report(
    client: &Client,
    provider: LLMProvider,
    prompt: &PromptPair,
    params: &GenerationParams,
) -> Result<String, ProviderError> {
    match provider_for(provider, client.clone()) {
        Some(backend) => backend.generate(prompt, params).await,
        None => Err(ProviderError::PreviewOnly),
    }
}
