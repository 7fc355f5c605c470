//! Configuration types, loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Default system prompt for the free-form question step.
pub const DEFAULT_AI_SYSTEM_PROMPT: &str = "\
You are the customer assistant for a borehole drilling and water services business. \
Answer the customer's question briefly and politely in plain text (no Markdown). \
If you do not know the answer, suggest they request a quote or talk to an agent from the main menu.";

/// Prices used to build the automatic quote estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct Tariff {
    /// Drilling price per metre of depth.
    pub rate_per_metre: Decimal,
    /// Added when the customer has not had a water survey done.
    pub survey_fee: Decimal,
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            rate_per_metre: dec!(25),
            survey_fee: dec!(150),
        }
    }
}

/// Settings consumed by step handlers.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// Name used in greetings and goodbyes.
    pub business_name: String,
    /// Identity (phone number) of the human operator who receives handoffs.
    pub operator_identity: String,
    /// How long a customer waits for an agent before being offered the menu again.
    pub handoff_timeout: Duration,
    pub tariff: Tariff,
    /// System prompt for the AI question step.
    pub ai_system_prompt: String,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            business_name: "Service Desk".to_string(),
            operator_identity: String::new(),
            handoff_timeout: Duration::from_secs(600), // 10 minutes
            tariff: Tariff::default(),
            ai_system_prompt: DEFAULT_AI_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Dispatcher behaviour that is not part of any step.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Keywords that restart the conversation from the welcome step.
    pub greetings: Vec<String>,
    /// Session expiry passed to the store on every write. `None` keeps sessions forever.
    pub session_ttl: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            greetings: ["hi", "hello", "hey", "start"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            session_ttl: None,
        }
    }
}

/// WhatsApp Cloud API credentials.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Shared secret echoed back during webhook verification.
    pub verify_token: SecretString,
    /// Bearer token for the Graph API.
    pub access_token: SecretString,
    /// Graph API base URL including the version segment.
    pub api_base: String,
}

/// Full process configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub whatsapp: WhatsAppConfig,
    pub flow: FlowSettings,
    pub dispatcher: DispatcherConfig,
    /// AI backend for the question step; `None` means canned answers only.
    pub llm: Option<LlmConfig>,
}

impl BotConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Config for the console REPL. WhatsApp credentials and the operator
    /// number are optional there; operator notices are printed locally.
    pub fn console_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            std::env::var(key).ok().or_else(|| match key {
                "WHATSAPP_VERIFY_TOKEN" | "WHATSAPP_ACCESS_TOKEN" => Some("unused".to_string()),
                "OPERATOR_NUMBER" => Some("operator".to_string()),
                _ => None,
            })
        })
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let verify_token = SecretString::from(required("WHATSAPP_VERIFY_TOKEN")?);
        let access_token = SecretString::from(required("WHATSAPP_ACCESS_TOKEN")?);
        let operator_identity = required("OPERATOR_NUMBER")?;

        let api_base = lookup("WHATSAPP_API_BASE")
            .unwrap_or_else(|| "https://graph.facebook.com/v19.0".to_string())
            .trim_end_matches('/')
            .to_string();

        let port: u16 = parse_or(&lookup, "BOT_PORT", 8080)?;
        let db_path = lookup("BOT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/service-bot.db"));

        let session_ttl = match lookup("BOT_SESSION_TTL_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_value("BOT_SESSION_TTL_SECS", &raw)?)),
            None => None,
        };
        let handoff_secs: u64 = parse_or(&lookup, "BOT_HANDOFF_TIMEOUT_SECS", 600)?;

        let tariff = Tariff {
            rate_per_metre: parse_or(&lookup, "BOT_RATE_PER_METRE", dec!(25))?,
            survey_fee: parse_or(&lookup, "BOT_SURVEY_FEE", dec!(150))?,
        };

        let greetings = match lookup("BOT_GREETINGS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DispatcherConfig::default().greetings,
        };

        let flow = FlowSettings {
            business_name: lookup("BOT_BUSINESS_NAME")
                .unwrap_or_else(|| FlowSettings::default().business_name),
            operator_identity,
            handoff_timeout: Duration::from_secs(handoff_secs),
            tariff,
            ai_system_prompt: lookup("BOT_AI_SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_AI_SYSTEM_PROMPT.to_string()),
        };

        // OpenAI wins when both keys are present.
        let llm = if let Some(key) = lookup("OPENAI_API_KEY") {
            Some(LlmConfig {
                backend: LlmBackend::OpenAi,
                api_key: SecretString::from(key),
                model: lookup("BOT_AI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            })
        } else {
            lookup("ANTHROPIC_API_KEY").map(|key| LlmConfig {
                backend: LlmBackend::Anthropic,
                api_key: SecretString::from(key),
                model: lookup("BOT_AI_MODEL")
                    .unwrap_or_else(|| "claude-3-5-haiku-latest".to_string()),
            })
        };

        Ok(Self {
            port,
            db_path,
            whatsapp: WhatsAppConfig {
                verify_token,
                access_token,
                api_base,
            },
            flow,
            dispatcher: DispatcherConfig {
                greetings,
                session_ttl,
            },
            llm,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}
