//! Channels: inbound adapters and outbound message delivery.

pub mod cli;
pub mod sender;
pub mod whatsapp;

pub use cli::{CLI_IDENTITY, ConsoleSender};
pub use sender::{Endpoint, MessageSender, split_message};
pub use whatsapp::{WebhookState, WhatsAppSender, webhook_routes};
