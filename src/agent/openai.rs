//! OpenAI-compatible chat completions backend

use crate::agent::{
    AgentError, AgentExecutor, AgentResponse, OpenAiConfig, StageRequest, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Client for an OpenAI-compatible `/chat/completions` endpoint
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    api_key: String,
    client: Client,
}

impl OpenAiClient {
    /// Create a client, reading the API key from `config.api_key_env`
    pub fn new(config: OpenAiConfig) -> Result<Self, AgentError> {
        let api_key = std::env::var(&config.api_key_env).unwrap_or_default();
        Self::with_api_key(config, api_key)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(config: OpenAiConfig, api_key: String) -> Result<Self, AgentError> {
        if api_key.trim().is_empty() {
            return Err(AgentError::NotConfigured(format!(
                "{} is not set",
                config.api_key_env
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Network(e.to_string()))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Convert a stage request to the wire format (pure function)
    fn build_request(&self, request: &StageRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(request.system_prompt()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(request.task_prompt()),
                },
            ],
            temperature: self.config.temperature,
        }
    }

    /// Extract the answer from a completion response (pure function)
    fn parse_response(response: ChatCompletionResponse) -> Result<AgentResponse, AgentError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Api("No choices returned".to_string()))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| AgentError::Api("Response contained no text".to_string()))?;

        Ok(AgentResponse {
            content,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

#[async_trait]
impl AgentExecutor for OpenAiClient {
    async fn execute(&self, request: &StageRequest) -> Result<AgentResponse, AgentError> {
        let body = self.build_request(request);
        debug!(
            "OpenAI request for stage {}: model {}, {} messages",
            request.stage_id,
            body.model,
            body.messages.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout(self.config.timeout_secs)
                } else {
                    warn!("OpenAI network error: {}", e);
                    AgentError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API error - Status: {}, Response: {}", status, error_text);
            return Err(AgentError::Api(format!("{} - {}", status, error_text)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Api(format!("Invalid response body: {}", e)))?;

        let result = Self::parse_response(parsed)?;
        if let Some(usage) = &result.usage {
            debug!(
                "OpenAI response for stage {}: {} tokens used",
                request.stage_id, usage.total_tokens
            );
        }
        Ok(result)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
