//! CLI channel: stdin/stdout REPL for local testing.
//!
//! Every line typed is one inbound message from [`CLI_IDENTITY`]. Replies to
//! that identity are printed to stdout; operator notices go to stderr.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::sender::{Endpoint, MessageSender};
use crate::dispatcher::Dispatcher;
use crate::error::ChannelError;

/// Identity used for the local conversation.
pub const CLI_IDENTITY: &str = "local-user";

/// Prints replies instead of sending them.
pub struct ConsoleSender;

#[async_trait]
impl MessageSender for ConsoleSender {
    fn name(&self) -> &str {
        "cli"
    }

    async fn send(
        &self,
        text: &str,
        recipient: &str,
        _endpoint: &Endpoint,
    ) -> Result<(), ChannelError> {
        if recipient == CLI_IDENTITY {
            println!("\n{text}\n");
        } else {
            eprintln!("[to {recipient}] {text}");
        }
        Ok(())
    }
}

/// Read lines from stdin until EOF or `/quit`, feeding each to `dispatcher`.
pub async fn run_repl(dispatcher: &Dispatcher) -> Result<(), ChannelError> {
    let endpoint = Endpoint::new("cli");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprint!("> ");
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break, // EOF
            Err(e) => {
                return Err(ChannelError::InvalidMessage(format!(
                    "Error reading stdin: {e}"
                )));
            }
        };
        if line.trim() == "/quit" {
            break;
        }
        if let Err(e) = dispatcher.handle(CLI_IDENTITY, &line, &endpoint).await {
            tracing::error!(error = %e, "Failed to handle message");
        }
        eprint!("> ");
    }
    Ok(())
}
