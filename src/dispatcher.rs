//! Dispatcher: one inbound message in, persisted state and replies out.
//!
//! For every message the dispatcher loads the session, routes it to exactly
//! one step handler, persists the returned state and then delivers the
//! handler's replies. Messages for the same identity are processed one at a
//! time; different identities run concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::channels::{Endpoint, MessageSender};
use crate::config::{DispatcherConfig, FlowSettings};
use crate::error::Error;
use crate::flow::{
    FlowContext, Language, LanguageRouter, Prompt, Recipient, Reply, Step, Transition, prompts,
};
use crate::llm::AnswerProvider;
use crate::session::SessionState;
use crate::store::{RecordStore, SessionStore};

/// Outcome of one handled message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Step persisted for the identity. `None` means the conversation ended.
    pub step: Option<Step>,
    pub language: Option<Language>,
    /// Replies the sender accepted.
    pub delivered: usize,
    /// Replies that could not be delivered.
    pub failed: usize,
}

pub struct Dispatcher {
    sessions: Arc<dyn SessionStore>,
    records: Arc<dyn RecordStore>,
    sender: Arc<dyn MessageSender>,
    answers: Arc<dyn AnswerProvider>,
    router: LanguageRouter,
    settings: FlowSettings,
    config: DispatcherConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Dispatcher {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        records: Arc<dyn RecordStore>,
        sender: Arc<dyn MessageSender>,
        answers: Arc<dyn AnswerProvider>,
        router: LanguageRouter,
        settings: FlowSettings,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            sessions,
            records,
            sender,
            answers,
            router,
            settings,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one inbound message using the current time.
    pub async fn handle(
        &self,
        identity: &str,
        text: &str,
        endpoint: &Endpoint,
    ) -> Result<DispatchReport, Error> {
        self.handle_at(identity, text, endpoint, Utc::now()).await
    }

    /// Handle one inbound message with an explicit clock reading.
    pub async fn handle_at(
        &self,
        identity: &str,
        text: &str,
        endpoint: &Endpoint,
        now: DateTime<Utc>,
    ) -> Result<DispatchReport, Error> {
        let lock = self.lock_for(identity).await;
        let result = {
            let _guard = lock.lock().await;
            self.process(identity, text, endpoint, now).await
        };
        drop(lock);
        self.release(identity).await;
        result
    }

    fn is_greeting(&self, input: &str) -> bool {
        self.config
            .greetings
            .iter()
            .any(|g| g.eq_ignore_ascii_case(input))
    }

    async fn process(
        &self,
        identity: &str,
        text: &str,
        endpoint: &Endpoint,
        now: DateTime<Utc>,
    ) -> Result<DispatchReport, Error> {
        let input = text.trim();

        let mut session = if self.is_greeting(input) {
            tracing::info!(%identity, "Greeting received; starting a new conversation");
            SessionState::new(identity)
        } else {
            match self.sessions.get_session(identity).await {
                Ok(session) => session,
                Err(e) => {
                    tracing::error!(%identity, error = %e, "Failed to load session");
                    self.apologize(identity, None, endpoint).await;
                    return Err(e.into());
                }
            }
        };
        if session.identity != identity {
            session.identity = identity.to_string();
        }

        let route = self.router.resolve(&session);
        let ctx = FlowContext {
            records: self.records.as_ref(),
            answers: self.answers.as_ref(),
            settings: &self.settings,
            language: route.language,
            endpoint,
            now,
        };
        tracing::debug!(
            %identity,
            graph = route.graph.name(),
            step = %route.handler.step(),
            language = %route.language,
            "Dispatching message"
        );

        let before = session.clone();
        let Transition { session, replies } = match route.handler.handle(&ctx, input, session).await
        {
            Ok(transition) => transition,
            Err(e) => {
                tracing::error!(%identity, error = %e, "Step handler failed");
                self.apologize(identity, Some(route.language), endpoint).await;
                return Err(e.into());
            }
        };
        let session = LanguageRouter::reconcile(&before, session);

        if let Err(e) = self
            .sessions
            .put_session(identity, &session, self.config.session_ttl)
            .await
        {
            tracing::error!(%identity, error = %e, "Failed to persist session");
            self.apologize(identity, session.language, endpoint).await;
            return Err(e.into());
        }

        let (delivered, failed) = self.deliver(identity, &replies, endpoint).await;
        tracing::info!(
            %identity,
            from = ?before.step,
            to = ?session.step,
            delivered,
            failed,
            "Message handled"
        );

        Ok(DispatchReport {
            step: session.step,
            language: session.language,
            delivered,
            failed,
        })
    }

    /// Send replies in order. Failures are logged and skipped.
    async fn deliver(&self, identity: &str, replies: &[Reply], endpoint: &Endpoint) -> (usize, usize) {
        let mut delivered = 0;
        let mut failed = 0;
        for reply in replies {
            let recipient = match reply.recipient {
                Recipient::Customer => identity,
                Recipient::Operator if self.settings.operator_identity.is_empty() => {
                    tracing::warn!("No operator configured; dropping operator notice");
                    failed += 1;
                    continue;
                }
                Recipient::Operator => self.settings.operator_identity.as_str(),
            };
            match self.sender.send(&reply.text, recipient, endpoint).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        channel = self.sender.name(),
                        %recipient,
                        error = %e,
                        "Failed to deliver reply"
                    );
                    failed += 1;
                }
            }
        }
        (delivered, failed)
    }

    async fn apologize(&self, identity: &str, language: Option<Language>, endpoint: &Endpoint) {
        let text = prompts::text(language.unwrap_or(Language::DEFAULT), Prompt::SystemError);
        if let Err(e) = self.sender.send(text, identity, endpoint).await {
            tracing::warn!(%identity, error = %e, "Failed to send apology");
        }
    }

    async fn lock_for(&self, identity: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(identity.to_string()).or_default())
    }

    /// Drop the identity's lock entry once nobody else holds or waits on it.
    async fn release(&self, identity: &str) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(identity)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(identity);
        }
    }

    #[cfg(test)]
    async fn tracked_identities(&self) -> usize {
        self.locks.lock().await.len()
    }
}
