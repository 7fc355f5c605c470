use async_trait::async_trait;

use super::{create_booking, main_menu, main_menu_with, reprompt};
use crate::error::FlowError;
use crate::flow::Step;
use crate::flow::graph::{FlowContext, StepHandler, Transition};
use crate::flow::input::{form_lines, menu_choice};
use crate::flow::prompts::Prompt;
use crate::session::{NOT_PROVIDED, SessionState, SubRecord, keys};

pub struct CollectBookingDetails;

#[async_trait]
impl StepHandler for CollectBookingDetails {
    fn step(&self) -> Step {
        Step::CollectBookingDetails
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        mut session: SessionState,
    ) -> Result<Transition, FlowError> {
        let Some(lines) = form_lines(input, 2) else {
            return Ok(Transition::to(session).say(ctx.text(Prompt::BookingDetailsIncomplete)));
        };
        let name = lines[0];
        let date = lines[1];
        let address = lines.get(2).copied().unwrap_or(NOT_PROVIDED);

        let data = &mut session.booking_data;
        data.set_text(keys::FULL_NAME, name);
        data.set_text(keys::PREFERRED_DATE, date);
        data.set_text(keys::ADDRESS, address);

        let confirm = ctx.render(
            Prompt::BookingConfirm,
            &[("name", name), ("date", date), ("address", address)],
        );
        Ok(Transition::to(session.at(Step::ConfirmBooking))
            .say(confirm)
            .say(ctx.text(Prompt::BookingConfirmMenu)))
    }
}

pub struct ConfirmBooking;

#[async_trait]
impl StepHandler for ConfirmBooking {
    fn step(&self) -> Step {
        Step::ConfirmBooking
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        mut session: SessionState,
    ) -> Result<Transition, FlowError> {
        match menu_choice(input, 2) {
            Some(1) => {
                let mut details = session.booking_data.clone();
                details.remove(keys::BOOKING_ID);
                let quote_id = session.quote_data.text(keys::QUOTE_ID).map(str::to_string);

                let booking =
                    create_booking(ctx, &session.identity, &details, quote_id.clone()).await?;
                session.booking_data.set_text(keys::BOOKING_ID, booking.id.as_str());
                tracing::info!(
                    identity = %session.identity,
                    booking_id = %booking.id,
                    quote_id = ?quote_id,
                    "Booking created"
                );

                let notice = format!(
                    "New booking {} from {}: name {}, date {}, address {}, quote {}",
                    booking.id,
                    session.identity,
                    details.display(keys::FULL_NAME),
                    details.display(keys::PREFERRED_DATE),
                    details.display(keys::ADDRESS),
                    quote_id.as_deref().unwrap_or("none"),
                );
                let created = ctx.render(Prompt::BookingCreated, &[("id", booking.id.as_str())]);
                Ok(Transition::to(session.at(Step::BookingResponse))
                    .notify(notice)
                    .say(created)
                    .say(ctx.text(Prompt::BookingMenu)))
            }
            Some(2) => {
                session.booking_data = SubRecord::new();
                Ok(main_menu_with(ctx, session, ctx.text(Prompt::BookingDiscarded)))
            }
            _ => Ok(reprompt(ctx, session, Prompt::BookingConfirmMenu)),
        }
    }
}

pub struct BookingResponse;

#[async_trait]
impl StepHandler for BookingResponse {
    fn step(&self) -> Step {
        Step::BookingResponse
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        session: SessionState,
    ) -> Result<Transition, FlowError> {
        match menu_choice(input, 4) {
            Some(1) => Ok(main_menu(ctx, session)),
            Some(2) => {
                let booking = match session.booking_data.text(keys::BOOKING_ID) {
                    Some(id) => ctx.records.get_booking(id).await?,
                    None => None,
                };
                let Some(mut booking) = booking else {
                    return Ok(main_menu(ctx, session));
                };
                booking.cancel(ctx.now);
                ctx.records.update_booking(&booking).await?;
                tracing::info!(identity = %session.identity, booking_id = %booking.id, "Booking cancelled");

                let cancelled = ctx.render(Prompt::BookingCancelled, &[("id", booking.id.as_str())]);
                let notice = format!("Booking {} was cancelled by {}", booking.id, session.identity);
                Ok(main_menu_with(ctx, session, cancelled).notify(notice))
            }
            Some(3) => Ok(Transition::to(session.at(Step::HumanAgent))
                .say(ctx.text(Prompt::AgentRequest))),
            Some(4) => {
                let goodbye = ctx.render(
                    Prompt::Goodbye,
                    &[("business", ctx.settings.business_name.as_str())],
                );
                Ok(Transition::to(session.finished()).say(goodbye))
            }
            _ => Ok(reprompt(ctx, session, Prompt::BookingMenu)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::handlers::testing::{Fixture, assert_idempotent_rejection, session_at};
    use crate::records::RecordStatus;
    use crate::store::RecordStore;

    #[tokio::test]
    async fn address_is_optional() {
        let fx = Fixture::new().await;
        let out = fx
            .run(
                &CollectBookingDetails,
                "Tendai Moyo\n12 March",
                session_at(Step::CollectBookingDetails),
            )
            .await;
        assert_eq!(out.session.step, Some(Step::ConfirmBooking));
        assert_eq!(out.session.booking_data.text(keys::ADDRESS), Some(NOT_PROVIDED));
        assert!(out.replies[0].text.contains("Tendai Moyo"));
    }

    #[tokio::test]
    async fn single_line_is_rejected() {
        let fx = Fixture::new().await;
        let session = session_at(Step::CollectBookingDetails);
        assert_idempotent_rejection(&fx, &CollectBookingDetails, "Tendai Moyo", session).await;
    }

    #[tokio::test]
    async fn confirming_creates_a_linked_booking() {
        let fx = Fixture::new().await;
        let mut session = session_at(Step::ConfirmBooking);
        session.quote_data.set_text(keys::QUOTE_ID, "QUOTE001");
        session.booking_data.set_text(keys::FULL_NAME, "Tendai Moyo");
        session.booking_data.set_text(keys::PREFERRED_DATE, "12 March");
        session.booking_data.set_text(keys::ADDRESS, "4 Main Rd");

        let out = fx.run(&ConfirmBooking, "1", session).await;
        assert_eq!(out.session.step, Some(Step::BookingResponse));
        let id = out.session.booking_data.text(keys::BOOKING_ID).unwrap();

        let booking = fx.records.get_booking(id).await.unwrap().unwrap();
        assert_eq!(booking.quote_id.as_deref(), Some("QUOTE001"));
        assert_eq!(booking.details.text(keys::ADDRESS), Some("4 Main Rd"));
        assert!(booking.details.get(keys::BOOKING_ID).is_none());

        let notices: Vec<_> = out.operator_notices().collect();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains(id));
    }

    #[tokio::test]
    async fn declining_discards_booking_data() {
        let fx = Fixture::new().await;
        let mut session = session_at(Step::ConfirmBooking);
        session.booking_data.set_text(keys::FULL_NAME, "Tendai Moyo");
        let out = fx.run(&ConfirmBooking, "2", session).await;
        assert_eq!(out.session.step, Some(Step::MainMenu));
        assert!(out.session.booking_data.is_empty());
        assert_eq!(out.customer_replies().count(), 2);
    }

    #[tokio::test]
    async fn cancelling_updates_the_record() {
        let fx = Fixture::new().await;
        let mut session = session_at(Step::ConfirmBooking);
        session.booking_data.set_text(keys::FULL_NAME, "Tendai Moyo");
        session.booking_data.set_text(keys::PREFERRED_DATE, "12 March");
        let booked = fx.run(&ConfirmBooking, "1", session).await.session;
        let id = booked.booking_data.text(keys::BOOKING_ID).unwrap().to_string();

        let out = fx.run(&BookingResponse, "2", booked).await;
        assert_eq!(out.session.step, Some(Step::MainMenu));
        let booking = fx.records.get_booking(&id).await.unwrap().unwrap();
        assert_eq!(booking.status, RecordStatus::Cancelled);
        assert_eq!(out.operator_notices().count(), 1);
    }

    #[tokio::test]
    async fn exit_finishes_the_conversation() {
        let fx = Fixture::new().await;
        let out = fx.run(&BookingResponse, "4", session_at(Step::BookingResponse)).await;
        assert!(out.session.is_finished());
        assert!(out.replies[0].text.contains("Borehole Co"));
    }

    #[tokio::test]
    async fn booking_menu_rejects_unknown_options() {
        let fx = Fixture::new().await;
        for input in ["", "5", "cancel"] {
            assert_idempotent_rejection(
                &fx,
                &BookingResponse,
                input,
                session_at(Step::BookingResponse),
            )
            .await;
        }
        assert_idempotent_rejection(&fx, &ConfirmBooking, "yes", session_at(Step::ConfirmBooking))
            .await;
    }
}
