//! Chat-completion client for station questions.
//!
//! Each question is one stateless exchange: a system message carrying the
//! station context and one user message. No conversation history is kept,
//! nothing is streamed and failures are not retried.

use super::prompts::system_prompt;
use crate::config::AssistantConfig;
use crate::logging::{self, Source};
use crate::model::{truncate_chars, AssistantError, AssistantExchange, BODY_SNIPPET_CHARS};
use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

pub struct AssistantClient {
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    client: Client,
}

impl AssistantClient {
    pub fn new(config: &AssistantConfig) -> Result<Self, AssistantError> {
        Self::with_timeout(config, config.timeout())
    }

    pub fn with_timeout(config: &AssistantConfig, timeout: Duration) -> Result<Self, AssistantError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(AssistantClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        })
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Builds the request body for one question.
    pub fn build_request(&self, question: &str, context: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: system_prompt(context),
                },
                ChatMessage {
                    role: Role::User,
                    content: question.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Asks one question about the station described by `context`.
    ///
    /// A blank `credential` fails with [`AssistantError::MissingCredential`]
    /// before any request is made.
    pub fn ask(&self, question: &str, context: &str, credential: &str) -> Result<String, AssistantError> {
        let result = self.send(question, context, credential);
        match &result {
            Ok(answer) => logging::info(
                Source::Assistant,
                None,
                &format!("Answered question ({} chars)", answer.chars().count()),
            ),
            Err(e) => logging::log_assistant_failure("Assistant question", e),
        }
        result
    }

    /// Like [`ask`](Self::ask), returning the full exchange record.
    pub fn ask_exchange(
        &self,
        question: &str,
        context: &str,
        credential: &str,
    ) -> Result<AssistantExchange, AssistantError> {
        let answer = self.ask(question, context, credential)?;
        Ok(AssistantExchange {
            question: question.to_string(),
            context: context.to_string(),
            answer,
        })
    }

    fn send(&self, question: &str, context: &str, credential: &str) -> Result<String, AssistantError> {
        let headers = auth_headers(credential)?;
        let request = self.build_request(question, context);

        logging::debug(
            Source::Assistant,
            None,
            &format!("POST {} model={}", self.completions_url(), self.model),
        );

        let response = self
            .client
            .post(self.completions_url())
            .headers(headers)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AssistantError::Status(
                status.as_u16(),
                truncate_chars(&body, BODY_SNIPPET_CHARS),
            ));
        }

        let completion: ChatCompletionResponse = response.json()?;
        extract_answer(completion)
    }
}

fn auth_headers(credential: &str) -> Result<HeaderMap, AssistantError> {
    let key = credential.trim();
    if key.is_empty() {
        return Err(AssistantError::MissingCredential);
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|error| {
        AssistantError::InvalidCredential(format!("not a valid header value: {}", error))
    })?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, value);
    Ok(headers)
}

/// First choice's text; blank or missing text is an empty response.
fn extract_answer(completion: ChatCompletionResponse) -> Result<String, AssistantError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(AssistantError::EmptyResponse)
}

// ============================================================================
// Tests
// ============================================================================
