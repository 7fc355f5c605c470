//! Step tokens: every position a conversation can be in.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named position in a flow graph.
///
/// The onboarding steps (`Welcome`, `SelectLanguage`) are language-agnostic;
/// every other step belongs to the service graph and is interpreted in the
/// session's selected language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Welcome,
    SelectLanguage,
    MainMenu,
    CollectQuoteDetails,
    QuoteResponse,
    CollectOfferAmount,
    OfferResponse,
    CollectBookingDetails,
    ConfirmBooking,
    BookingResponse,
    CheckStatus,
    AskQuestion,
    HumanAgent,
    WaitingForAgent,
    AgentFollowUp,
}

impl Step {
    /// Every step, in flow order.
    pub const ALL: [Step; 15] = [
        Step::Welcome,
        Step::SelectLanguage,
        Step::MainMenu,
        Step::CollectQuoteDetails,
        Step::QuoteResponse,
        Step::CollectOfferAmount,
        Step::OfferResponse,
        Step::CollectBookingDetails,
        Step::ConfirmBooking,
        Step::BookingResponse,
        Step::CheckStatus,
        Step::AskQuestion,
        Step::HumanAgent,
        Step::WaitingForAgent,
        Step::AgentFollowUp,
    ];

    /// Initial step of a fresh session.
    pub const INITIAL: Step = Step::Welcome;

    /// Whether this step runs before a language has been chosen.
    pub fn is_onboarding(&self) -> bool {
        matches!(self, Self::Welcome | Self::SelectLanguage)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::SelectLanguage => "select_language",
            Self::MainMenu => "main_menu",
            Self::CollectQuoteDetails => "collect_quote_details",
            Self::QuoteResponse => "quote_response",
            Self::CollectOfferAmount => "collect_offer_amount",
            Self::OfferResponse => "offer_response",
            Self::CollectBookingDetails => "collect_booking_details",
            Self::ConfirmBooking => "confirm_booking",
            Self::BookingResponse => "booking_response",
            Self::CheckStatus => "check_status",
            Self::AskQuestion => "ask_question",
            Self::HumanAgent => "human_agent",
            Self::WaitingForAgent => "waiting_for_agent",
            Self::AgentFollowUp => "agent_follow_up",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Step::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("unknown step: {s}"))
    }
}
