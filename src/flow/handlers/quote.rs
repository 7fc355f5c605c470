use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{create_quote, format_money, main_menu, main_menu_with, reprompt};
use crate::config::Tariff;
use crate::error::FlowError;
use crate::flow::Step;
use crate::flow::graph::{FlowContext, StepHandler, Transition};
use crate::flow::input::{form_lines, is_negative, leading_number, menu_choice, parse_amount};
use crate::flow::prompts::Prompt;
use crate::records::Quote;
use crate::session::{SessionState, keys};

/// Automatic estimate: depth × rate, plus the survey fee when no survey was
/// done. `None` when the depth has no number in it or the total overflows.
pub(crate) fn estimate(tariff: &Tariff, depth: &str, survey_done: &str) -> Option<Decimal> {
    let metres = leading_number(depth)?;
    let total = metres.checked_mul(tariff.rate_per_metre)?;
    if is_negative(survey_done) {
        return total.checked_add(tariff.survey_fee);
    }
    Some(total)
}

/// The quote referenced by the session, if it still exists.
async fn active_quote(
    ctx: &FlowContext<'_>,
    session: &SessionState,
) -> Result<Option<Quote>, FlowError> {
    match session.quote_data.text(keys::QUOTE_ID) {
        Some(id) => Ok(ctx.records.get_quote(id).await?),
        None => Ok(None),
    }
}

fn no_active_quote(ctx: &FlowContext<'_>, session: SessionState) -> Transition {
    main_menu_with(ctx, session, ctx.text(Prompt::NoActiveQuote))
}

pub struct CollectQuoteDetails;

#[async_trait]
impl StepHandler for CollectQuoteDetails {
    fn step(&self) -> Step {
        Step::CollectQuoteDetails
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        mut session: SessionState,
    ) -> Result<Transition, FlowError> {
        let Some(lines) = form_lines(input, 4) else {
            return Ok(Transition::to(session).say(ctx.text(Prompt::QuoteDetailsIncomplete)));
        };
        let (location, depth, purpose, survey) = (lines[0], lines[1], lines[2], lines[3]);

        let data = &mut session.quote_data;
        data.set_text(keys::LOCATION, location);
        data.set_text(keys::DEPTH, depth);
        data.set_text(keys::PURPOSE, purpose);
        data.set_text(keys::SURVEY_DONE, survey);
        data.remove(keys::QUOTE_ID);
        data.remove(keys::ESTIMATE);

        let estimated = estimate(&ctx.settings.tariff, depth, survey);
        if let Some(amount) = estimated {
            data.set_text(keys::ESTIMATE, amount.to_string());
        }

        let quote = create_quote(ctx, &session.identity, &session.quote_data, estimated).await?;
        session.quote_data.set_text(keys::QUOTE_ID, quote.id.as_str());
        session.offer_data = Default::default();
        tracing::info!(
            identity = %session.identity,
            quote_id = %quote.id,
            estimate = ?estimated,
            "Quote created"
        );

        let estimate_text = match estimated {
            Some(amount) => format_money(amount),
            None => ctx.text(Prompt::EstimatePending).to_string(),
        };
        let summary = ctx.render(
            Prompt::QuoteSummary,
            &[
                ("id", quote.id.as_str()),
                ("location", location),
                ("depth", depth),
                ("purpose", purpose),
                ("survey", survey),
                ("estimate", estimate_text.as_str()),
            ],
        );
        Ok(Transition::to(session.at(Step::QuoteResponse))
            .say(summary)
            .say(ctx.text(Prompt::QuoteMenu)))
    }
}

pub struct QuoteResponse;

#[async_trait]
impl StepHandler for QuoteResponse {
    fn step(&self) -> Step {
        Step::QuoteResponse
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        session: SessionState,
    ) -> Result<Transition, FlowError> {
        match menu_choice(input, 4) {
            Some(1) => {
                let Some(mut quote) = active_quote(ctx, &session).await? else {
                    return Ok(no_active_quote(ctx, session));
                };
                quote.accept(ctx.now);
                ctx.records.update_quote(&quote).await?;
                tracing::info!(identity = %session.identity, quote_id = %quote.id, "Quote accepted");
                let accepted = ctx.render(Prompt::QuoteAccepted, &[("id", quote.id.as_str())]);
                Ok(Transition::to(session.at(Step::CollectBookingDetails))
                    .say(accepted)
                    .say(ctx.text(Prompt::BookingDetailsRequest)))
            }
            Some(2) => Ok(Transition::to(session.at(Step::CollectOfferAmount))
                .say(ctx.text(Prompt::OfferRequest))),
            Some(3) => Ok(Transition::to(session.at(Step::HumanAgent))
                .say(ctx.text(Prompt::AgentRequest))),
            Some(4) => Ok(main_menu(ctx, session)),
            _ => Ok(reprompt(ctx, session, Prompt::QuoteMenu)),
        }
    }
}

pub struct CollectOfferAmount;

#[async_trait]
impl StepHandler for CollectOfferAmount {
    fn step(&self) -> Step {
        Step::CollectOfferAmount
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        mut session: SessionState,
    ) -> Result<Transition, FlowError> {
        let Some(mut quote) = active_quote(ctx, &session).await? else {
            return Ok(no_active_quote(ctx, session));
        };
        let Some(amount) = parse_amount(input) else {
            return Ok(Transition::to(session).say(ctx.text(Prompt::OfferInvalid)));
        };

        quote.offer(amount, ctx.now);
        ctx.records.update_quote(&quote).await?;
        session.offer_data.set_text(keys::AMOUNT, amount.to_string());
        session.offer_data.set_text(keys::QUOTE_ID, quote.id.as_str());
        tracing::info!(
            identity = %session.identity,
            quote_id = %quote.id,
            %amount,
            "Price offer received"
        );

        let quoted_estimate = quote
            .estimate
            .map(format_money)
            .unwrap_or_else(|| "none".to_string());
        let notice = format!(
            "Price offer from {}: {} for quote {} (estimate {}, location {}, depth {})",
            session.identity,
            format_money(amount),
            quote.id,
            quoted_estimate,
            quote.details.display(keys::LOCATION),
            quote.details.display(keys::DEPTH),
        );
        let amount_text = amount.to_string();
        let received = ctx.render(
            Prompt::OfferReceived,
            &[("amount", amount_text.as_str()), ("id", quote.id.as_str())],
        );
        Ok(Transition::to(session.at(Step::OfferResponse))
            .notify(notice)
            .say(received)
            .say(ctx.text(Prompt::OfferMenu)))
    }
}

pub struct OfferResponse;

#[async_trait]
impl StepHandler for OfferResponse {
    fn step(&self) -> Step {
        Step::OfferResponse
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        session: SessionState,
    ) -> Result<Transition, FlowError> {
        match menu_choice(input, 2) {
            Some(1) => Ok(Transition::to(session.at(Step::CollectBookingDetails))
                .say(ctx.text(Prompt::BookingDetailsRequest))),
            Some(2) => Ok(main_menu(ctx, session)),
            _ => Ok(reprompt(ctx, session, Prompt::OfferMenu)),
        }
    }
}
