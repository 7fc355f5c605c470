use async_trait::async_trait;

use super::{main_menu, reprompt};
use crate::error::FlowError;
use crate::flow::Step;
use crate::flow::graph::{FlowContext, StepHandler, Transition};
use crate::flow::input::menu_choice;
use crate::flow::prompts::Prompt;
use crate::session::{SessionState, SubRecord};

pub struct MainMenu;

#[async_trait]
impl StepHandler for MainMenu {
    fn step(&self) -> Step {
        Step::MainMenu
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        mut session: SessionState,
    ) -> Result<Transition, FlowError> {
        let (next, prompt) = match menu_choice(input, 6) {
            Some(1) => {
                // A new quote replaces whatever quote was active.
                session.quote_data = SubRecord::new();
                session.offer_data = SubRecord::new();
                (Step::CollectQuoteDetails, Prompt::QuoteDetailsRequest)
            }
            Some(2) => (Step::CollectBookingDetails, Prompt::BookingDetailsRequest),
            Some(3) => (Step::CheckStatus, Prompt::StatusRequest),
            Some(4) => (Step::AskQuestion, Prompt::QuestionRequest),
            Some(5) => (Step::HumanAgent, Prompt::AgentRequest),
            Some(6) => (Step::SelectLanguage, Prompt::LanguageMenu),
            _ => return Ok(reprompt(ctx, session, Prompt::MainMenu)),
        };
        tracing::debug!(identity = %session.identity, next = %next, "Main menu choice");
        Ok(Transition::to(session.at(next)).say(ctx.text(prompt)))
    }
}

/// Fallback for the service graph: re-send the main menu.
pub struct MainMenuReset;

#[async_trait]
impl StepHandler for MainMenuReset {
    fn step(&self) -> Step {
        Step::MainMenu
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        _input: &str,
        session: SessionState,
    ) -> Result<Transition, FlowError> {
        Ok(main_menu(ctx, session))
    }
}
