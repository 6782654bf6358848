// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Blocking client for an OpenAI-compatible HTTP API (chat completions and
//! embeddings).

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::AppConfig;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Inputs per embeddings request.
const EMBEDDING_BATCH: usize = 100;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API key is not set ({})", API_KEY_ENV)]
    MissingApiKey,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Malformed API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("API response contained no {0}")]
    Empty(&'static str),
}

/// Produces the raw answer for a fully rendered prompt.
pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Turns texts into embedding vectors, one per input, in input order.
pub trait Embedder {
    fn model(&self) -> &str;
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

impl<T: Generator + ?Sized> Generator for &T {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).generate(prompt)
    }
}

impl<T: Embedder + ?Sized> Embedder for &T {
    fn model(&self) -> &str {
        (**self).model()
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        (**self).embed(texts)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct OpenAiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(config: &AppConfig, api_key: &str) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            "OpenAI client ready — base_url={} chat_model={} embedding_model={}",
            config.api_base_url, config.chat_model, config.embedding_model
        );
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            api_key: api_key.trim().to_string(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: config.temperature,
        })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.api_url(endpoint))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|e| {
                error!("Request failed — endpoint={} error={}", endpoint, e);
                LlmError::Http(e)
            })?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }
        Ok(text)
    }
}

impl Generator for OpenAiClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };
        debug!(
            "Sending chat completion — model={} prompt_chars={}",
            self.chat_model,
            prompt.chars().count()
        );

        let body = self.post("chat/completions", &request)?;
        parse_chat_response(&body)
    }
}

impl Embedder for OpenAiClient {
    fn model(&self) -> &str {
        &self.embedding_model
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBEDDING_BATCH) {
            let request = EmbeddingRequest {
                model: &self.embedding_model,
                input: batch,
            };
            let body = self.post("embeddings", &request)?;
            let mut batch_vectors = parse_embedding_response(&body)?;
            if batch_vectors.len() != batch.len() {
                return Err(LlmError::Empty("embedding for every input"));
            }
            vectors.append(&mut batch_vectors);
        }
        debug!("Embedded texts — count={}", vectors.len());
        Ok(vectors)
    }
}

fn parse_chat_response(body: &str) -> Result<String, LlmError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::Empty("choices"))?;
    debug!(
        "Chat completion received — finish_reason={:?}",
        choice.finish_reason
    );
    choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(LlmError::Empty("message content"))
}

fn parse_embedding_response(body: &str) -> Result<Vec<Vec<f32>>, LlmError> {
    let mut response: EmbeddingResponse = serde_json::from_str(body)?;
    response.data.sort_by_key(|d| d.index);
    Ok(response.data.into_iter().map(|d| d.embedding).collect())
}

fn api_error(status: u16, body: &str) -> LlmError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    error!("API error — status={} message={}", status, message);
    LlmError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let body = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "관광지 이름: 수원화성" }, "finish_reason": "stop" }
            ]
        }"#;
        assert_eq!(parse_chat_response(body).unwrap(), "관광지 이름: 수원화성");
    }

    #[test]
    fn test_empty_chat_response_is_an_error() {
        assert!(matches!(
            parse_chat_response(r#"{ "choices": [] }"#),
            Err(LlmError::Empty("choices"))
        ));
        assert!(matches!(
            parse_chat_response(r#"{ "choices": [ { "message": { "content": null } } ] }"#),
            Err(LlmError::Empty(_))
        ));
    }

    #[test]
    fn test_embeddings_are_ordered_by_index() {
        let body = r#"{ "data": [
            { "index": 1, "embedding": [0.0, 1.0] },
            { "index": 0, "embedding": [1.0, 0.0] }
        ] }"#;
        let vectors = parse_embedding_response(body).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_api_error_message_is_extracted() {
        let err = api_error(401, r#"{ "error": { "message": "Incorrect API key", "type": "auth" } }"#);
        assert_eq!(err.to_string(), "API returned 401: Incorrect API key");
        let err = api_error(502, "Bad Gateway\n");
        assert_eq!(err.to_string(), "API returned 502: Bad Gateway");
    }

    #[test]
    fn test_blank_key_is_rejected() {
        assert!(matches!(
            OpenAiClient::new(&AppConfig::default(), "  "),
            Err(LlmError::MissingApiKey)
        ));
    }
}
