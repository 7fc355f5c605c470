//! Human handoff: collect a description, notify the operator, then wait.
//!
//! There is no timer. The wait is checked lazily when the customer's next
//! message arrives.

use async_trait::async_trait;
use chrono::TimeDelta;

use super::{main_menu, reprompt};
use crate::error::FlowError;
use crate::flow::Step;
use crate::flow::graph::{FlowContext, StepHandler, Transition};
use crate::flow::input::menu_choice;
use crate::flow::prompts::Prompt;
use crate::session::SessionState;

pub struct HumanAgent;

#[async_trait]
impl StepHandler for HumanAgent {
    fn step(&self) -> Step {
        Step::HumanAgent
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        mut session: SessionState,
    ) -> Result<Transition, FlowError> {
        if input.is_empty() {
            return Ok(Transition::to(session).say(ctx.text(Prompt::AgentRequest)));
        }

        session.agent_requested_at = Some(ctx.now);
        tracing::info!(identity = %session.identity, language = %ctx.language, "Agent requested");
        let notice = format!(
            "Customer {} ({}) is asking for an agent: {}",
            session.identity, ctx.language, input
        );
        Ok(Transition::to(session.at(Step::WaitingForAgent))
            .notify(notice)
            .say(ctx.text(Prompt::AgentRequested)))
    }
}

/// Waits for the operator to pick up the conversation.
pub struct WaitingForAgent;

#[async_trait]
impl StepHandler for WaitingForAgent {
    fn step(&self) -> Step {
        Step::WaitingForAgent
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        session: SessionState,
    ) -> Result<Transition, FlowError> {
        let timeout = TimeDelta::from_std(ctx.settings.handoff_timeout).unwrap_or(TimeDelta::MAX);
        let waited = session.agent_requested_at.map(|at| ctx.now - at);

        match waited {
            Some(waited) if waited < timeout => {
                tracing::debug!(
                    identity = %session.identity,
                    waited_secs = waited.num_seconds(),
                    "Forwarding message to operator"
                );
                let notice = format!("Message from {} while waiting: {}", session.identity, input);
                Ok(Transition::to(session).notify(notice))
            }
            _ => {
                tracing::info!(identity = %session.identity, "Agent wait timed out");
                Ok(Transition::to(session.at(Step::AgentFollowUp))
                    .say(ctx.text(Prompt::AgentUnavailable)))
            }
        }
    }
}

pub struct AgentFollowUp;

#[async_trait]
impl StepHandler for AgentFollowUp {
    fn step(&self) -> Step {
        Step::AgentFollowUp
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        mut session: SessionState,
    ) -> Result<Transition, FlowError> {
        match menu_choice(input, 2) {
            Some(1) => Ok(main_menu(ctx, session)),
            Some(2) => {
                session.agent_requested_at = Some(ctx.now);
                let notice = format!("Customer {} is still waiting for an agent", session.identity);
                Ok(Transition::to(session.at(Step::WaitingForAgent))
                    .notify(notice)
                    .say(ctx.text(Prompt::AgentStillWaiting)))
            }
            _ => Ok(reprompt(ctx, session, Prompt::AgentFollowUpMenu)),
        }
    }
}
