use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::config::{ApiConfig, PromptStyle};
use crate::prompt::{ChatMessage, Prompt};
use crate::sanitize::strip_code_fence;

/// Shown whenever the failure is ours or the network's rather than the API's.
pub const GENERIC_FAILURE: &str = "An error occurred while generating the landing page.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The upstream reported an error object in the response body.
    #[error("{0}")]
    Api(String),
    #[error("transport error: {0}")]
    Transport(String),
    /// The body arrived but did not have the shape we expect.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GenerationError {
    /// Text suitable for the view. Only API messages are passed through.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Api(message) => message.clone(),
            GenerationError::Transport(_) | GenerationError::Malformed(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    error: Option<ApiErrorBody>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    model: String,
    style: PromptStyle,
    max_tokens: u32,
    temperature: f32,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn with_config(config: &ApiConfig, api_key: Option<String>) -> Self {
        OpenAiClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            style: config.style,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn style(&self) -> PromptStyle {
        self.style
    }

    fn endpoint(&self) -> String {
        match self.style {
            PromptStyle::Completion => format!("{}/completions", self.base_url),
            PromptStyle::Chat => format!("{}/chat/completions", self.base_url),
        }
    }

    /// One request, no retry. Transport and shape failures are logged here and
    /// collapse to the generic message in the view.
    pub async fn generate(&self, idea: &str) -> Result<String, GenerationError> {
        let result = self.send(idea).await;
        match &result {
            Ok(text) => debug!(chars = text.len(), "landing page generated"),
            Err(GenerationError::Api(message)) => warn!(%message, "completion API returned an error"),
            Err(e) => error!(error = %e, "landing page request failed"),
        }
        result
    }

    async fn send(&self, idea: &str) -> Result<String, GenerationError> {
        let url = self.endpoint();
        let mut request = self.client.post(&url);

        request = match Prompt::for_style(self.style, idea) {
            Prompt::Completion(prompt) => request.json(&CompletionRequest {
                model: &self.model,
                prompt,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            }),
            Prompt::Chat(messages) => request.json(&ChatCompletionRequest {
                model: &self.model,
                messages,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            }),
        };

        match &self.api_key {
            Some(key) => request = request.bearer_auth(key),
            None => warn!("no API key configured; sending request without Authorization header"),
        }

        debug!(%url, model = %self.model, style = ?self.style, "sending generation request");

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        debug!(%status, bytes = body.len(), "generation response received");

        // Errors come back in the body, usually with a 4xx status, so the
        // status code alone is not consulted.
        let parsed: ApiResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Malformed(format!("HTTP {}: {}", status, e)))?;

        extract_result(self.style, parsed)
    }
}

fn extract_result(style: PromptStyle, response: ApiResponse) -> Result<String, GenerationError> {
    if let Some(error) = response.error {
        return match error.message {
            Some(message) => Err(GenerationError::Api(message)),
            None => Err(GenerationError::Malformed("error object without message".to_string())),
        };
    }

    let first = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::Malformed("no choices in response".to_string()))?;

    let text = match style {
        PromptStyle::Completion => first.text,
        PromptStyle::Chat => first.message.and_then(|m| m.content),
    };

    text.map(|t| strip_code_fence(&t))
        .ok_or_else(|| GenerationError::Malformed(format!("choice has no {:?} text", style)))
}
