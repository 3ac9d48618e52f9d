//! OpenAI chat-completion client
//!
//! The insight generators only ever need one call shape: a single user
//! prompt, one text answer. The client bakes that in - `complete` wraps the
//! prompt in a one-message chat request at the insight temperature and
//! unwraps the first choice. Faults are typed so callers can log something
//! more useful than raw response bodies.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_COMPLETION_TOKENS: u32 = 2048;

// Model constants
pub const GPT_35_TURBO: &str = "gpt-3.5-turbo";

/// Sampling temperature used for insight generation
pub const INSIGHT_TEMPERATURE: f64 = 0.7;

/// Faults from the generative capability. All of them are recovered inside
/// the generators; the variants exist so the log line can say what happened.
#[derive(Debug, Error)]
pub enum OpenAiFault {
    #[error("OpenAI rejected the API key")]
    InvalidApiKey,

    #[error("OpenAI rate limit hit")]
    RateLimited,

    #[error("OpenAI API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    #[error("OpenAI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI response contained no choices")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

impl ChatCompletionRequest {
    /// The one request shape the generators use: a single user prompt at the
    /// insight temperature.
    fn for_prompt(prompt: &str) -> Self {
        Self {
            model: GPT_35_TURBO,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: INSIGHT_TEMPERATURE,
            max_tokens: MAX_COMPLETION_TOKENS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

fn fault_for_status(status: StatusCode, body: String) -> OpenAiFault {
    match status.as_u16() {
        401 => OpenAiFault::InvalidApiKey,
        429 => OpenAiFault::RateLimited,
        _ => OpenAiFault::Api { status, body },
    }
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
        }
    }

    /// Submit a single insight prompt and return the model's text answer.
    pub async fn complete(&self, prompt: &str) -> Result<String, OpenAiFault> {
        let request = ChatCompletionRequest::for_prompt(prompt);

        let response = self.client
            .post(OPENAI_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(fault_for_status(status, body));
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(OpenAiFault::EmptyResponse)
    }
}
