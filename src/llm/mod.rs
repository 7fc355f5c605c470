//! AI answer collaborator for the free-form question step.
//!
//! Supports:
//! - **OpenAI**: Direct API access via rig-core
//! - **Anthropic**: Direct API access via rig-core
//!
//! The flow never surfaces an `LlmError` to the customer; it substitutes a
//! canned answer instead (see [`answer_or`]).

mod rig_adapter;

pub use rig_adapter::RigAnswerer;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LlmError;

/// Something that can answer a customer's question.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Answer `question` under `system_prompt`.
    async fn answer(&self, system_prompt: &str, question: &str) -> Result<String, LlmError>;
}

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Anthropic,
    OpenAi,
}

/// Configuration for creating an answer provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
}

/// Create an answer provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn AnswerProvider>, LlmError> {
    Ok(Arc::new(RigAnswerer::new(config)?))
}

/// Provider used when no AI backend is configured. Always fails, so callers
/// fall back to their canned answer.
pub struct NoAnswers;

#[async_trait]
impl AnswerProvider for NoAnswers {
    fn name(&self) -> &str {
        "none"
    }

    async fn answer(&self, _system_prompt: &str, _question: &str) -> Result<String, LlmError> {
        Err(LlmError::NotConfigured)
    }
}

/// Ask `provider`, returning `fallback` on any failure or an empty answer.
pub async fn answer_or(
    provider: &dyn AnswerProvider,
    system_prompt: &str,
    question: &str,
    fallback: &str,
) -> String {
    match provider.answer(system_prompt, question).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            tracing::warn!(provider = provider.name(), "Empty AI answer; using fallback");
            fallback.to_string()
        }
        Err(e) => {
            tracing::warn!(provider = provider.name(), error = %e, "AI answer failed; using fallback");
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait]
    impl AnswerProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn answer(&self, _system: &str, _question: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn answer_or_passes_through_success() {
        let answer = answer_or(&Fixed("  We drill up to 120m.  "), "sys", "how deep?", "sorry").await;
        assert_eq!(answer, "We drill up to 120m.");
    }

    #[tokio::test]
    async fn answer_or_uses_fallback_on_error() {
        let answer = answer_or(&NoAnswers, "sys", "how deep?", "sorry").await;
        assert_eq!(answer, "sorry");
    }

    #[tokio::test]
    async fn answer_or_uses_fallback_on_blank_answer() {
        let answer = answer_or(&Fixed("   "), "sys", "how deep?", "sorry").await;
        assert_eq!(answer, "sorry");
    }

    #[test]
    fn test_create_provider_constructs_without_network() {
        // rig-core clients accept any string as API key at construction time.
        let config = LlmConfig {
            backend: LlmBackend::OpenAi,
            api_key: secrecy::SecretString::from("sk-test"),
            model: "gpt-4o-mini".to_string(),
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
