//! WhatsApp Cloud API channel.
//!
//! Inbound: a webhook (`GET /webhook` verification handshake, `POST /webhook`
//! message notifications). Outbound: the Graph API `/{phone_number_id}/messages`
//! endpoint with a bearer token.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::sender::{Endpoint, MessageSender, split_message};
use crate::config::WhatsAppConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ChannelError;

/// Maximum text body length accepted by the Cloud API.
const WHATSAPP_MAX_MESSAGE_LENGTH: usize = 4096;

// ── Outbound ────────────────────────────────────────────────────────────

pub struct WhatsAppSender {
    client: reqwest::Client,
    api_base: String,
    access_token: SecretString,
}

impl WhatsAppSender {
    pub fn new(config: &WhatsAppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    fn messages_url(&self, endpoint: &Endpoint) -> String {
        format!("{}/{}/messages", self.api_base, endpoint)
    }

    async fn send_chunk(&self, url: &str, recipient: &str, text: &str) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": recipient,
            "type": "text",
            "text": { "preview_url": false, "body": text },
        });

        let resp = self
            .client
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "whatsapp".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "whatsapp".into(),
                reason: format!("{status}: {detail}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSender for WhatsAppSender {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn send(
        &self,
        text: &str,
        recipient: &str,
        endpoint: &Endpoint,
    ) -> Result<(), ChannelError> {
        if endpoint.as_str().is_empty() {
            return Err(ChannelError::InvalidMessage(
                "missing phone_number_id for outbound message".into(),
            ));
        }
        let url = self.messages_url(endpoint);
        for chunk in split_message(text, WHATSAPP_MAX_MESSAGE_LENGTH) {
            self.send_chunk(&url, recipient, &chunk).await?;
        }
        tracing::debug!(%recipient, %endpoint, "WhatsApp message sent");
        Ok(())
    }
}

// ── Webhook payload ─────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub messages: Vec<WaMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub phone_number_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WaMessage {
    pub from: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub text: Option<TextBody>,
    pub interactive: Option<Interactive>,
    pub button: Option<ButtonBody>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct Interactive {
    pub button_reply: Option<ReplyId>,
    pub list_reply: Option<ReplyId>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyId {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ButtonBody {
    pub payload: Option<String>,
    pub text: Option<String>,
}

/// A customer message ready for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub from: String,
    pub endpoint: Endpoint,
    pub text: String,
}

impl WaMessage {
    /// Text the flow should see: the body for text messages, the reply id
    /// for interactive buttons and lists.
    fn flow_text(&self) -> Option<String> {
        match self.kind.as_str() {
            "text" => self.text.as_ref().map(|t| t.body.clone()),
            "interactive" => self.interactive.as_ref().and_then(|i| {
                i.button_reply
                    .as_ref()
                    .or(i.list_reply.as_ref())
                    .map(|r| r.id.clone())
            }),
            "button" => self
                .button
                .as_ref()
                .and_then(|b| b.payload.clone().or_else(|| b.text.clone())),
            _ => None,
        }
    }
}

/// Pull every customer message out of a webhook notification. Status
/// callbacks and unsupported message types are skipped.
pub fn extract_messages(payload: &WebhookPayload) -> Vec<InboundMessage> {
    let mut out = Vec::new();
    for change in payload.entry.iter().flat_map(|e| &e.changes) {
        let endpoint = Endpoint::new(change.value.metadata.phone_number_id.as_str());
        for message in &change.value.messages {
            match message.flow_text() {
                Some(text) => out.push(InboundMessage {
                    from: message.from.clone(),
                    endpoint: endpoint.clone(),
                    text,
                }),
                None => tracing::debug!(
                    from = %message.from,
                    kind = %message.kind,
                    "Skipping unsupported WhatsApp message type"
                ),
            }
        }
    }
    out
}

// ── Routes ──────────────────────────────────────────────────────────────

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct WebhookState {
    pub dispatcher: Arc<Dispatcher>,
    pub verify_token: SecretString,
}

/// Build the webhook router: `/webhook` (GET + POST) and `/health`.
pub fn webhook_routes(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", get(verify).post(receive))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

async fn verify(
    State(state): State<WebhookState>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    let token_ok = params.verify_token.as_deref() == Some(state.verify_token.expose_secret());
    if params.mode.as_deref() == Some("subscribe") && token_ok {
        tracing::info!("WhatsApp webhook verified");
        (StatusCode::OK, params.challenge.unwrap_or_default())
    } else {
        let err = ChannelError::VerificationFailed {
            name: "whatsapp".into(),
        };
        tracing::warn!(mode = ?params.mode, "{err}");
        (StatusCode::FORBIDDEN, String::new())
    }
}

async fn receive(
    State(state): State<WebhookState>,
    Json(payload): Json<WebhookPayload>,
) -> StatusCode {
    let messages = extract_messages(&payload);
    let mut failed = false;
    for message in messages {
        if let Err(e) = state
            .dispatcher
            .handle(&message.from, &message.text, &message.endpoint)
            .await
        {
            tracing::error!(from = %message.from, error = %e, "Failed to handle WhatsApp message");
            failed = true;
        }
    }
    if failed {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}
