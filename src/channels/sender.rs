//! Outbound message delivery.

use std::fmt;

use async_trait::async_trait;

use crate::error::ChannelError;

/// Transport-level reference identifying which business endpoint an inbound
/// message arrived on, so replies leave through the same endpoint.
///
/// For WhatsApp this is the `phone_number_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sends a text message to one recipient.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    /// Deliver `text` to `recipient` through `endpoint`.
    async fn send(&self, text: &str, recipient: &str, endpoint: &Endpoint)
    -> Result<(), ChannelError>;
}

/// Split `text` into chunks of at most `max_chars` characters, preferring
/// line breaks, then spaces, then a hard cut on a character boundary.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.chars().count() <= max_chars {
            chunks.push(remaining.to_string());
            break;
        }

        // Byte offset of the first character past the limit.
        let limit = remaining
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(remaining.len());
        let window = &remaining[..limit];

        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&i| i > 0)
            .unwrap_or(limit);

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start_matches(['\n', ' ']);
    }

    chunks
}
