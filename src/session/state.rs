//! Persisted per-customer conversation state.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::record::SubRecord;
use crate::flow::{Language, Step};

/// Sub-record keys shared by handlers and persisted records.
pub mod keys {
    pub const LOCATION: &str = "location";
    pub const DEPTH: &str = "depth";
    pub const PURPOSE: &str = "purpose";
    pub const SURVEY_DONE: &str = "survey_done";
    pub const QUOTE_ID: &str = "quote_id";
    pub const ESTIMATE: &str = "estimate";
    pub const AMOUNT: &str = "amount";
    pub const FULL_NAME: &str = "full_name";
    pub const PREFERRED_DATE: &str = "preferred_date";
    pub const ADDRESS: &str = "address";
    pub const BOOKING_ID: &str = "booking_id";
}

/// One customer's conversation state.
///
/// Stored whole: every write replaces the previous value. Attributes the
/// typed fields do not know about are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub identity: String,
    /// Current step. `None` marks a finished conversation.
    #[serde(default, deserialize_with = "lenient")]
    pub step: Option<Step>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default)]
    pub quote_data: SubRecord,
    #[serde(default)]
    pub booking_data: SubRecord,
    #[serde(default)]
    pub offer_data: SubRecord,
    /// When the customer asked for a human agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_requested_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SessionState {
    /// A fresh session at the initial step.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            step: Some(Step::INITIAL),
            language: None,
            quote_data: SubRecord::default(),
            booking_data: SubRecord::default(),
            offer_data: SubRecord::default(),
            agent_requested_at: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Copy of this session moved to `step`.
    pub fn at(mut self, step: Step) -> Self {
        self.step = Some(step);
        self
    }

    /// Copy of this session with the conversation ended.
    pub fn finished(mut self) -> Self {
        self.step = None;
        self
    }

    pub fn is_finished(&self) -> bool {
        self.step.is_none()
    }
}

/// Deserialize an optional token, mapping unknown values to `None` so a
/// stale token degrades to the fallback handler instead of a decode error.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(token = %s, "Ignoring unknown token in stored session");
            None
        }
    }))
}
