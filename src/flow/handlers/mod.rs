//! Step handlers and the two standard flow graphs.

mod booking;
mod handoff;
mod menu;
mod onboarding;
mod question;
mod quote;
mod status;

use std::sync::Arc;

use rust_decimal::Decimal;

pub use booking::{BookingResponse, CollectBookingDetails, ConfirmBooking};
pub use handoff::{AgentFollowUp, HumanAgent, WaitingForAgent};
pub use menu::{MainMenu, MainMenuReset};
pub use onboarding::{SelectLanguage, Welcome};
pub use question::AskQuestion;
pub use quote::{CollectOfferAmount, CollectQuoteDetails, OfferResponse, QuoteResponse};
pub use status::CheckStatus;

use super::graph::{FlowContext, FlowGraph, Transition};
use super::prompts::Prompt;
use super::step::Step;
use crate::error::{DatabaseError, FlowError};
use crate::records::reference::MAX_ATTEMPTS;
use crate::records::{Booking, Quote};
use crate::session::{SessionState, SubRecord};

/// Onboarding graph: greeting and language selection. Unknown steps restart
/// at the welcome message.
pub fn onboarding_graph() -> Result<FlowGraph, FlowError> {
    FlowGraph::builder("onboarding")
        .register(Arc::new(Welcome))?
        .register(Arc::new(SelectLanguage))?
        .fallback(Arc::new(Welcome))
        .build()
}

/// Service graph, shared by every language. Unknown steps reset to the main
/// menu.
pub fn service_graph() -> Result<FlowGraph, FlowError> {
    FlowGraph::builder("service")
        .register(Arc::new(MainMenu))?
        .register(Arc::new(CollectQuoteDetails))?
        .register(Arc::new(QuoteResponse))?
        .register(Arc::new(CollectOfferAmount))?
        .register(Arc::new(OfferResponse))?
        .register(Arc::new(CollectBookingDetails))?
        .register(Arc::new(ConfirmBooking))?
        .register(Arc::new(BookingResponse))?
        .register(Arc::new(CheckStatus))?
        .register(Arc::new(AskQuestion))?
        .register(Arc::new(HumanAgent))?
        .register(Arc::new(WaitingForAgent))?
        .register(Arc::new(AgentFollowUp))?
        .fallback(Arc::new(MainMenuReset))
        .build()
}

/// Move to the main menu and send it.
pub(crate) fn main_menu(ctx: &FlowContext<'_>, mut session: SessionState) -> Transition {
    session.agent_requested_at = None;
    Transition::to(session.at(Step::MainMenu)).say(ctx.text(Prompt::MainMenu))
}

/// Send `notice`, then move to the main menu.
pub(crate) fn main_menu_with(
    ctx: &FlowContext<'_>,
    session: SessionState,
    notice: impl Into<String>,
) -> Transition {
    let Transition { session, replies } = main_menu(ctx, session);
    let mut out = Transition::to(session).say(notice);
    out.replies.extend(replies);
    out
}

/// Reject a menu answer: explain and repeat `menu`, leaving the session as is.
pub(crate) fn reprompt(ctx: &FlowContext<'_>, session: SessionState, menu: Prompt) -> Transition {
    Transition::to(session).say(format!(
        "{}\n\n{}",
        ctx.text(Prompt::InvalidOption),
        ctx.text(menu)
    ))
}

pub(crate) fn format_money(amount: Decimal) -> String {
    format!("${}", amount.round_dp(2))
}

/// Insert a new quote, retrying with a fresh reference on a key collision.
pub(crate) async fn create_quote(
    ctx: &FlowContext<'_>,
    identity: &str,
    details: &SubRecord,
    estimate: Option<Decimal>,
) -> Result<Quote, FlowError> {
    for attempt in 1..=MAX_ATTEMPTS {
        let quote = Quote::new(identity, details.clone(), estimate, ctx.now);
        match ctx.records.insert_quote(&quote).await {
            Ok(()) => return Ok(quote),
            Err(DatabaseError::Constraint(reason)) => {
                tracing::warn!(attempt, quote_id = %quote.id, %reason, "Quote reference collision");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(FlowError::ReferenceExhausted {
        entity: "quote".to_string(),
        attempts: MAX_ATTEMPTS,
    })
}

/// Insert a new booking, retrying with a fresh reference on a key collision.
pub(crate) async fn create_booking(
    ctx: &FlowContext<'_>,
    identity: &str,
    details: &SubRecord,
    quote_id: Option<String>,
) -> Result<Booking, FlowError> {
    for attempt in 1..=MAX_ATTEMPTS {
        let booking = Booking::new(identity, details.clone(), quote_id.clone(), ctx.now);
        match ctx.records.insert_booking(&booking).await {
            Ok(()) => return Ok(booking),
            Err(DatabaseError::Constraint(reason)) => {
                tracing::warn!(attempt, booking_id = %booking.id, %reason, "Booking reference collision");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(FlowError::ReferenceExhausted {
        entity: "booking".to_string(),
        attempts: MAX_ATTEMPTS,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for handler tests.

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};

    use crate::channels::Endpoint;
    use crate::config::FlowSettings;
    use crate::error::LlmError;
    use crate::flow::graph::{FlowContext, StepHandler, Transition};
    use crate::flow::{Language, Step};
    use crate::llm::AnswerProvider;
    use crate::session::SessionState;
    use crate::store::LibSqlBackend;

    pub const CUSTOMER: &str = "263771234567";
    pub const OPERATOR: &str = "263779999999";

    pub struct Canned(pub Option<&'static str>);

    #[async_trait]
    impl AnswerProvider for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn answer(&self, _system: &str, _question: &str) -> Result<String, LlmError> {
            self.0.map(str::to_string).ok_or(LlmError::NotConfigured)
        }
    }

    pub struct Fixture {
        pub records: LibSqlBackend,
        pub answers: Canned,
        pub settings: FlowSettings,
        pub endpoint: Endpoint,
        pub now: DateTime<Utc>,
    }

    impl Fixture {
        pub async fn new() -> Self {
            Self {
                records: LibSqlBackend::new_memory().await.unwrap(),
                answers: Canned(None),
                settings: FlowSettings {
                    business_name: "Borehole Co".to_string(),
                    operator_identity: OPERATOR.to_string(),
                    ..FlowSettings::default()
                },
                endpoint: Endpoint::new("1234567890"),
                now: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            }
        }

        pub fn ctx(&self, language: Language) -> FlowContext<'_> {
            FlowContext {
                records: &self.records,
                answers: &self.answers,
                settings: &self.settings,
                language,
                endpoint: &self.endpoint,
                now: self.now,
            }
        }

        pub async fn run(
            &self,
            handler: &dyn StepHandler,
            input: &str,
            session: SessionState,
        ) -> Transition {
            let language = session.language.unwrap_or(Language::DEFAULT);
            handler.handle(&self.ctx(language), input, session).await.unwrap()
        }
    }

    pub fn session_at(step: Step) -> SessionState {
        let mut session = SessionState::new(CUSTOMER).at(step);
        session.language = Some(Language::English);
        session
    }

    /// Run `handler` twice with the same invalid input and check nothing moves.
    pub async fn assert_idempotent_rejection(
        fx: &Fixture,
        handler: &dyn StepHandler,
        input: &str,
        session: SessionState,
    ) {
        let first = fx.run(handler, input, session.clone()).await;
        assert_eq!(first.session, session, "invalid input {input:?} changed the session");
        assert!(first.customer_replies().count() > 0, "no corrective message for {input:?}");
        let second = fx.run(handler, input, first.session.clone()).await;
        assert_eq!(second.session, first.session);
        assert_eq!(second.replies, first.replies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_graphs_cover_every_step() {
        let onboarding = onboarding_graph().unwrap();
        let service = service_graph().unwrap();
        for step in Step::ALL {
            assert_ne!(
                onboarding.contains(step),
                service.contains(step),
                "{step} must belong to exactly one graph"
            );
            assert_eq!(onboarding.contains(step), step.is_onboarding());
        }
    }

    #[test]
    fn money_is_formatted_with_dollar_sign() {
        use rust_decimal_macros::dec;
        assert_eq!(format_money(dec!(1150)), "$1150");
        assert_eq!(format_money(dec!(99.999)), "$100.00");
    }
}
