//! Flow graphs: an immutable step → handler map plus a fallback handler.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::language::Language;
use super::prompts::{self, Prompt};
use super::step::Step;
use crate::channels::Endpoint;
use crate::config::FlowSettings;
use crate::error::FlowError;
use crate::llm::AnswerProvider;
use crate::session::SessionState;
use crate::store::RecordStore;

/// Everything a handler may consult besides the input and the session.
pub struct FlowContext<'a> {
    pub records: &'a dyn RecordStore,
    pub answers: &'a dyn AnswerProvider,
    pub settings: &'a FlowSettings,
    /// Language the prompts are rendered in for this turn.
    pub language: Language,
    /// Endpoint the inbound message arrived on.
    pub endpoint: &'a Endpoint,
    /// Wall clock reading for this message.
    pub now: DateTime<Utc>,
}

impl FlowContext<'_> {
    pub fn text(&self, prompt: Prompt) -> &'static str {
        prompts::text(self.language, prompt)
    }

    pub fn render(&self, prompt: Prompt, args: &[(&str, &str)]) -> String {
        prompts::render(self.text(prompt), args)
    }
}

/// Who an outbound reply is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// The customer whose message is being handled.
    Customer,
    /// The configured human operator.
    Operator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub recipient: Recipient,
    pub text: String,
}

/// Result of one handler invocation: the state to persist and the replies
/// to deliver, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: SessionState,
    pub replies: Vec<Reply>,
}

impl Transition {
    pub fn to(session: SessionState) -> Self {
        Self {
            session,
            replies: Vec::new(),
        }
    }

    /// Queue a message for the customer.
    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.replies.push(Reply {
            recipient: Recipient::Customer,
            text: text.into(),
        });
        self
    }

    /// Queue a notice for the operator.
    pub fn notify(mut self, text: impl Into<String>) -> Self {
        self.replies.push(Reply {
            recipient: Recipient::Operator,
            text: text.into(),
        });
        self
    }

    pub fn customer_replies(&self) -> impl Iterator<Item = &str> {
        self.replies
            .iter()
            .filter(|r| r.recipient == Recipient::Customer)
            .map(|r| r.text.as_str())
    }

    pub fn operator_notices(&self) -> impl Iterator<Item = &str> {
        self.replies
            .iter()
            .filter(|r| r.recipient == Recipient::Operator)
            .map(|r| r.text.as_str())
    }
}

/// Handles inbound text for one step.
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// The step this handler is registered under.
    fn step(&self) -> Step;

    /// Handle `input` (already trimmed) for `session`.
    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        session: SessionState,
    ) -> Result<Transition, FlowError>;
}

/// An immutable step → handler map with a fallback.
pub struct FlowGraph {
    name: &'static str,
    handlers: HashMap<Step, Arc<dyn StepHandler>>,
    fallback: Arc<dyn StepHandler>,
}

impl FlowGraph {
    pub fn builder(name: &'static str) -> FlowGraphBuilder {
        FlowGraphBuilder {
            name,
            handlers: HashMap::new(),
            fallback: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn contains(&self, step: Step) -> bool {
        self.handlers.contains_key(&step)
    }

    /// Handler for `step`, or the fallback when the step is absent or not
    /// registered here.
    pub fn resolve(&self, step: Option<Step>) -> &dyn StepHandler {
        match step.and_then(|s| self.handlers.get(&s)) {
            Some(handler) => handler.as_ref(),
            None => {
                tracing::debug!(
                    graph = self.name,
                    step = ?step,
                    "No handler for step; using fallback"
                );
                self.fallback.as_ref()
            }
        }
    }
}

pub struct FlowGraphBuilder {
    name: &'static str,
    handlers: HashMap<Step, Arc<dyn StepHandler>>,
    fallback: Option<Arc<dyn StepHandler>>,
}

impl FlowGraphBuilder {
    /// Register a handler under its step. A second handler for the same
    /// step is rejected.
    pub fn register(mut self, handler: Arc<dyn StepHandler>) -> Result<Self, FlowError> {
        let step = handler.step();
        if self.handlers.contains_key(&step) {
            return Err(FlowError::DuplicateStep {
                graph: self.name.to_string(),
                step: step.to_string(),
            });
        }
        self.handlers.insert(step, handler);
        Ok(self)
    }

    pub fn fallback(mut self, handler: Arc<dyn StepHandler>) -> Self {
        self.fallback = Some(handler);
        self
    }

    pub fn build(self) -> Result<FlowGraph, FlowError> {
        let fallback = self.fallback.ok_or_else(|| FlowError::MissingFallback {
            graph: self.name.to_string(),
        })?;
        tracing::debug!(graph = self.name, steps = self.handlers.len(), "Flow graph built");
        Ok(FlowGraph {
            name: self.name,
            handlers: self.handlers,
            fallback,
        })
    }
}
