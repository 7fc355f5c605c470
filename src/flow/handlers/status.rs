use async_trait::async_trait;

use super::main_menu_with;
use crate::error::FlowError;
use crate::flow::Step;
use crate::flow::graph::{FlowContext, StepHandler, Transition};
use crate::flow::input::BACK_TO_MENU;
use crate::flow::prompts::Prompt;
use crate::records::{RecordStatus, reference};
use crate::session::SessionState;

fn status_label(ctx: &FlowContext<'_>, status: RecordStatus) -> &'static str {
    ctx.text(match status {
        RecordStatus::Pending => Prompt::StatusPending,
        RecordStatus::Accepted => Prompt::StatusAccepted,
        RecordStatus::Offered => Prompt::StatusOffered,
        RecordStatus::Cancelled => Prompt::StatusCancelled,
    })
}

/// Look up a quote or booking by reference.
pub struct CheckStatus;

#[async_trait]
impl StepHandler for CheckStatus {
    fn step(&self) -> Step {
        Step::CheckStatus
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        session: SessionState,
    ) -> Result<Transition, FlowError> {
        if input == BACK_TO_MENU {
            return Ok(super::main_menu(ctx, session));
        }
        let Some(id) = reference::normalize(input) else {
            return Ok(Transition::to(session).say(ctx.text(Prompt::StatusInvalid)));
        };

        let found = if let Some(quote) = ctx.records.get_quote(&id).await? {
            Some((Prompt::QuoteStatus, quote.status))
        } else {
            ctx.records
                .get_booking(&id)
                .await?
                .map(|booking| (Prompt::BookingStatus, booking.status))
        };

        match found {
            Some((prompt, status)) => {
                tracing::debug!(identity = %session.identity, reference = %id, %status, "Status lookup");
                let report = ctx.render(
                    prompt,
                    &[("id", id.as_str()), ("status", status_label(ctx, status))],
                );
                Ok(main_menu_with(ctx, session, report))
            }
            None => {
                let missing = ctx.render(Prompt::StatusNotFound, &[("id", id.as_str())]);
                Ok(Transition::to(session).say(missing))
            }
        }
    }
}
