//! End-to-end dialogue tests: the real dispatcher, router and handlers over
//! an in-memory libSQL database, with a recording sender.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use service_bot::channels::{Endpoint, MessageSender};
use service_bot::config::{DispatcherConfig, FlowSettings};
use service_bot::dispatcher::Dispatcher;
use service_bot::error::ChannelError;
use service_bot::flow::{Language, LanguageRouter, Step};
use service_bot::llm::NoAnswers;
use service_bot::records::RecordStatus;
use service_bot::session::{SessionState, keys};
use service_bot::store::{LibSqlBackend, RecordStore, SessionStore};

const CUSTOMER: &str = "263771234567";
const OPERATOR: &str = "263779999999";

#[derive(Debug, Clone, PartialEq)]
struct Sent {
    recipient: String,
    endpoint: String,
    text: String,
}

/// Records every outbound message; can be switched to fail every send.
#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<Sent>>,
    fail: AtomicBool,
}

impl RecordingSender {
    fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    fn to(&self, recipient: &str) -> Vec<String> {
        self.take()
            .into_iter()
            .filter(|s| s.recipient == recipient)
            .map(|s| s.text)
            .collect()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str, recipient: &str, endpoint: &Endpoint) -> Result<(), ChannelError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChannelError::SendFailed {
                name: "recording".into(),
                reason: "transport down".into(),
            });
        }
        self.sent.lock().unwrap().push(Sent {
            recipient: recipient.to_string(),
            endpoint: endpoint.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

struct Harness {
    dispatcher: Arc<Dispatcher>,
    backend: Arc<LibSqlBackend>,
    sender: Arc<RecordingSender>,
    endpoint: Endpoint,
}

impl Harness {
    async fn new() -> Self {
        Self::with_backend(Arc::new(LibSqlBackend::new_memory().await.unwrap()))
    }

    fn with_backend(backend: Arc<LibSqlBackend>) -> Self {
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = Dispatcher::new(
            backend.clone(),
            backend.clone(),
            sender.clone(),
            Arc::new(NoAnswers),
            LanguageRouter::standard().unwrap(),
            FlowSettings {
                business_name: "Borehole Co".to_string(),
                operator_identity: OPERATOR.to_string(),
                ..FlowSettings::default()
            },
            DispatcherConfig::default(),
        );
        Self {
            dispatcher: Arc::new(dispatcher),
            backend,
            sender,
            endpoint: Endpoint::new("PNID"),
        }
    }

    async fn say(&self, text: &str) -> Option<Step> {
        self.dispatcher
            .handle(CUSTOMER, text, &self.endpoint)
            .await
            .unwrap()
            .step
    }

    async fn say_at(&self, text: &str, now: DateTime<Utc>) -> Option<Step> {
        self.dispatcher
            .handle_at(CUSTOMER, text, &self.endpoint, now)
            .await
            .unwrap()
            .step
    }

    async fn session(&self) -> SessionState {
        self.backend.get_session(CUSTOMER).await.unwrap()
    }

    /// Greet and pick English; leaves the customer at the main menu.
    async fn onboard(&self) {
        assert_eq!(self.say("hi").await, Some(Step::SelectLanguage));
        assert_eq!(self.say("1").await, Some(Step::MainMenu));
        self.sender.take();
    }
}

#[tokio::test]
async fn greeting_sends_exactly_one_welcome() {
    let h = Harness::new().await;
    assert_eq!(h.say("hi").await, Some(Step::SelectLanguage));

    let sent = h.sender.take();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, CUSTOMER);
    assert_eq!(sent[0].endpoint, "PNID");
    assert!(sent[0].text.contains("Borehole Co"));
}

#[tokio::test]
async fn unknown_customer_gets_welcome_for_any_text() {
    let h = Harness::new().await;
    assert_eq!(h.say("what do you do?").await, Some(Step::SelectLanguage));
    assert_eq!(h.sender.take().len(), 1);
}

#[tokio::test]
async fn choosing_english_lands_on_main_menu() {
    let h = Harness::new().await;
    h.onboard().await;
    let session = h.session().await;
    assert_eq!(session.language, Some(Language::English));
    assert_eq!(session.step, Some(Step::MainMenu));
}

#[tokio::test]
async fn full_quote_to_booking_path() {
    let h = Harness::new().await;
    h.onboard().await;

    assert_eq!(h.say("1").await, Some(Step::CollectQuoteDetails));
    assert_eq!(
        h.say("Harare\n40m\nDomestic\nYes").await,
        Some(Step::QuoteResponse)
    );
    let session = h.session().await;
    assert_eq!(session.quote_data.text(keys::LOCATION), Some("Harare"));
    let quote_id = session.quote_data.text(keys::QUOTE_ID).unwrap().to_string();
    assert_eq!(quote_id.len(), 8);
    assert!(
        quote_id
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    );

    assert_eq!(h.say("1").await, Some(Step::CollectBookingDetails));
    assert_eq!(
        h.say("Tendai Moyo\n12 March\n4 Main Rd").await,
        Some(Step::ConfirmBooking)
    );
    h.sender.take();
    assert_eq!(h.say("1").await, Some(Step::BookingResponse));

    let to_operator = h
        .sender
        .take()
        .into_iter()
        .filter(|s| s.recipient == OPERATOR)
        .count();
    assert_eq!(to_operator, 1);

    let booking_id = h
        .session()
        .await
        .booking_data
        .text(keys::BOOKING_ID)
        .unwrap()
        .to_string();
    let booking = h.backend.get_booking(&booking_id).await.unwrap().unwrap();
    assert_eq!(booking.quote_id.as_deref(), Some(quote_id.as_str()));
    let quote = h.backend.get_quote(&quote_id).await.unwrap().unwrap();
    assert_eq!(quote.status, RecordStatus::Accepted);

    // Exit ends the conversation; the next message brings back the menu.
    assert_eq!(h.say("4").await, None);
    assert_eq!(h.say("anything").await, Some(Step::MainMenu));
}

#[tokio::test]
async fn short_quote_details_are_rejected() {
    let h = Harness::new().await;
    h.onboard().await;
    h.say("1").await;
    h.sender.take();

    assert_eq!(
        h.say("Harare\n40m\nDomestic").await,
        Some(Step::CollectQuoteDetails)
    );
    let replies = h.sender.to(CUSTOMER);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("all 4 details"));
}

#[tokio::test]
async fn repeated_invalid_input_leaves_state_unchanged() {
    let h = Harness::new().await;
    h.onboard().await;
    let before = h.session().await;

    h.say("9").await;
    let after_first = h.session().await;
    h.say("9").await;
    let after_second = h.session().await;

    assert_eq!(after_first, before);
    assert_eq!(after_second, before);
}

#[tokio::test]
async fn handoff_waits_then_offers_follow_up() {
    let h = Harness::new().await;
    h.onboard().await;
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

    assert_eq!(h.say_at("5", t0).await, Some(Step::HumanAgent));
    assert_eq!(
        h.say_at("Pump not working", t0).await,
        Some(Step::WaitingForAgent)
    );
    let notices = h.sender.to(OPERATOR);
    assert!(notices.iter().any(|n| n.contains("Pump not working")));

    // Below the threshold: nothing to the customer, text forwarded.
    let below = t0 + TimeDelta::minutes(5);
    assert_eq!(h.say_at("Any news?", below).await, Some(Step::WaitingForAgent));
    let sent = h.sender.take();
    assert!(sent.iter().all(|s| s.recipient == OPERATOR));
    assert!(sent.iter().any(|s| s.text.contains("Any news?")));

    // Past the threshold: unavailable message and follow-up menu.
    let above = t0 + TimeDelta::minutes(11);
    assert_eq!(h.say_at("Hello??", above).await, Some(Step::AgentFollowUp));
    let replies = h.sender.to(CUSTOMER);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("Keep waiting"));

    assert_eq!(h.say_at("2", above).await, Some(Step::WaitingForAgent));
    assert_eq!(h.session().await.agent_requested_at, Some(above));
}

#[tokio::test]
async fn send_failures_do_not_block_persistence() {
    let h = Harness::new().await;
    h.sender.fail.store(true, Ordering::SeqCst);

    let report = h
        .dispatcher
        .handle(CUSTOMER, "hi", &h.endpoint)
        .await
        .unwrap();
    assert_eq!(report.delivered, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(h.session().await.step, Some(Step::SelectLanguage));
}

#[tokio::test]
async fn greeting_resets_mid_conversation() {
    let h = Harness::new().await;
    h.onboard().await;
    h.say("1").await;

    assert_eq!(h.say("HELLO").await, Some(Step::SelectLanguage));
    let session = h.session().await;
    assert_eq!(session.language, None);
    assert!(session.quote_data.is_empty());
}

#[tokio::test]
async fn changing_language_switches_prompts() {
    let h = Harness::new().await;
    h.onboard().await;

    assert_eq!(h.say("6").await, Some(Step::SelectLanguage));
    assert_eq!(h.say("2").await, Some(Step::MainMenu));
    let replies = h.sender.to(CUSTOMER);
    assert!(replies.last().unwrap().starts_with("Menyu Huru"));

    h.say("7").await;
    let replies = h.sender.to(CUSTOMER);
    assert!(replies[0].starts_with("Ndine urombo"));
}

#[tokio::test]
async fn question_step_uses_canned_answer_without_ai() {
    let h = Harness::new().await;
    h.onboard().await;
    assert_eq!(h.say("4").await, Some(Step::AskQuestion));
    h.sender.take();
    assert_eq!(h.say("Do you drill in Gweru?").await, Some(Step::AskQuestion));
    let replies = h.sender.to(CUSTOMER);
    assert_eq!(replies.len(), 2);
    assert!(replies[0].starts_with("Sorry, I can't answer"));
}

#[tokio::test]
async fn status_lookup_reports_quote() {
    let h = Harness::new().await;
    h.onboard().await;
    h.say("1").await;
    h.say("Harare\n40m\nDomestic\nNo").await;
    let quote_id = h
        .session()
        .await
        .quote_data
        .text(keys::QUOTE_ID)
        .unwrap()
        .to_string();
    h.say("4").await;
    h.sender.take();

    assert_eq!(h.say("3").await, Some(Step::CheckStatus));
    assert_eq!(h.say(&quote_id.to_lowercase()).await, Some(Step::MainMenu));
    let replies = h.sender.to(CUSTOMER);
    assert!(replies.iter().any(|r| r.contains(&quote_id) && r.contains("pending")));
}

#[tokio::test]
async fn sessions_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot.db");

    {
        let h = Harness::with_backend(Arc::new(LibSqlBackend::new_local(&path).await.unwrap()));
        h.onboard().await;
        h.say("1").await;
    }

    let h = Harness::with_backend(Arc::new(LibSqlBackend::new_local(&path).await.unwrap()));
    let session = h.session().await;
    assert_eq!(session.step, Some(Step::CollectQuoteDetails));
    assert_eq!(session.language, Some(Language::English));
}

#[tokio::test]
async fn concurrent_identities_are_independent() {
    let h = Harness::new().await;
    let mut tasks = Vec::new();
    for i in 0..20 {
        let dispatcher = Arc::clone(&h.dispatcher);
        let endpoint = h.endpoint.clone();
        tasks.push(tokio::spawn(async move {
            let identity = format!("2637700000{i:02}");
            dispatcher.handle(&identity, "hi", &endpoint).await.unwrap();
            dispatcher.handle(&identity, "3", &endpoint).await.unwrap();
            identity
        }));
    }
    for task in tasks {
        let identity = task.await.unwrap();
        let session = h.backend.get_session(&identity).await.unwrap();
        assert_eq!(session.language, Some(Language::Ndebele));
        assert_eq!(session.step, Some(Step::MainMenu));
    }
}

#[tokio::test]
async fn same_identity_messages_are_serialized() {
    let h = Harness::new().await;
    h.onboard().await;

    // Ten concurrent invalid menu answers must each see a consistent state.
    let mut tasks = Vec::new();
    for _ in 0..10 {
        let dispatcher = Arc::clone(&h.dispatcher);
        let endpoint = h.endpoint.clone();
        tasks.push(tokio::spawn(async move {
            dispatcher.handle(CUSTOMER, "9", &endpoint).await.unwrap()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().step, Some(Step::MainMenu));
    }
    assert_eq!(h.sender.to(CUSTOMER).len(), 10);
}

#[tokio::test]
async fn expired_sessions_restart_at_welcome() {
    let backend = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let mut session = SessionState::new(CUSTOMER).at(Step::MainMenu);
    session.language = Some(Language::English);
    backend
        .put_session(CUSTOMER, &session, Some(Duration::from_millis(1)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let h = Harness::with_backend(backend);
    assert_eq!(h.say("1").await, Some(Step::SelectLanguage));
}
