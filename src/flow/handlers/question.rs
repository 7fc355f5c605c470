use async_trait::async_trait;

use super::main_menu;
use crate::error::FlowError;
use crate::flow::Step;
use crate::flow::graph::{FlowContext, StepHandler, Transition};
use crate::flow::input::BACK_TO_MENU;
use crate::flow::prompts::Prompt;
use crate::llm::answer_or;
use crate::session::SessionState;

/// Free-form questions answered by the AI collaborator. The step loops
/// until the customer returns to the menu.
pub struct AskQuestion;

#[async_trait]
impl StepHandler for AskQuestion {
    fn step(&self) -> Step {
        Step::AskQuestion
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        session: SessionState,
    ) -> Result<Transition, FlowError> {
        if input == BACK_TO_MENU {
            return Ok(main_menu(ctx, session));
        }
        if input.is_empty() {
            return Ok(Transition::to(session).say(ctx.text(Prompt::QuestionRequest)));
        }

        let system_prompt = format!(
            "{}\n\nReply in {}.",
            ctx.settings.ai_system_prompt, ctx.language
        );
        let answer = answer_or(
            ctx.answers,
            &system_prompt,
            input,
            ctx.text(Prompt::AiUnavailable),
        )
        .await;

        Ok(Transition::to(session)
            .say(answer)
            .say(ctx.text(Prompt::QuestionFollowUp)))
    }
}
