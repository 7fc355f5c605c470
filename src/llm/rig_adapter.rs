//! rig-core backed [`AnswerProvider`].

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::{anthropic, openai};
use secrecy::ExposeSecret;

use super::{AnswerProvider, LlmBackend, LlmConfig};
use crate::error::LlmError;

/// Upper bound on answer length; chat replies should stay short.
const MAX_ANSWER_TOKENS: u64 = 512;

enum RigClient {
    Anthropic(rig::client::Client<anthropic::client::AnthropicExt>),
    OpenAi(rig::client::Client<openai::client::OpenAIResponsesExt>),
}

/// Answers questions through a rig-core completion agent.
pub struct RigAnswerer {
    client: RigClient,
    model: String,
}

impl RigAnswerer {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = match config.backend {
            LlmBackend::Anthropic => RigClient::Anthropic(
                anthropic::Client::new(config.api_key.expose_secret()).map_err(|e| {
                    LlmError::RequestFailed {
                        provider: "anthropic".to_string(),
                        reason: format!("Failed to create Anthropic client: {}", e),
                    }
                })?,
            ),
            LlmBackend::OpenAi => RigClient::OpenAi(
                openai::Client::new(config.api_key.expose_secret()).map_err(|e| {
                    LlmError::RequestFailed {
                        provider: "openai".to_string(),
                        reason: format!("Failed to create OpenAI client: {}", e),
                    }
                })?,
            ),
        };
        tracing::info!(provider = provider_name(&client), model = %config.model, "AI answers enabled");
        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }
}

fn provider_name(client: &RigClient) -> &'static str {
    match client {
        RigClient::Anthropic(_) => "anthropic",
        RigClient::OpenAi(_) => "openai",
    }
}

#[async_trait]
impl AnswerProvider for RigAnswerer {
    fn name(&self) -> &str {
        provider_name(&self.client)
    }

    async fn answer(&self, system_prompt: &str, question: &str) -> Result<String, LlmError> {
        let result = match &self.client {
            RigClient::Anthropic(client) => {
                client
                    .agent(&self.model)
                    .preamble(system_prompt)
                    .max_tokens(MAX_ANSWER_TOKENS)
                    .build()
                    .prompt(question)
                    .await
            }
            RigClient::OpenAi(client) => {
                client
                    .agent(&self.model)
                    .preamble(system_prompt)
                    .max_tokens(MAX_ANSWER_TOKENS)
                    .build()
                    .prompt(question)
                    .await
            }
        };

        result.map_err(|e| LlmError::RequestFailed {
            provider: self.name().to_string(),
            reason: e.to_string(),
        })
    }
}
