//! Chooses the flow graph and prompt language for a session.

use super::graph::{FlowGraph, StepHandler};
use super::handlers;
use super::language::Language;
use super::step::Step;
use crate::error::FlowError;
use crate::session::SessionState;

/// A resolved handler plus the language its prompts render in.
pub struct Route<'a> {
    pub graph: &'a FlowGraph,
    pub handler: &'a dyn StepHandler,
    pub language: Language,
}

pub struct LanguageRouter {
    onboarding: FlowGraph,
    service: FlowGraph,
}

impl LanguageRouter {
    pub fn new(onboarding: FlowGraph, service: FlowGraph) -> Self {
        Self {
            onboarding,
            service,
        }
    }

    /// Router over the standard onboarding and service graphs.
    pub fn standard() -> Result<Self, FlowError> {
        Ok(Self::new(
            handlers::onboarding_graph()?,
            handlers::service_graph()?,
        ))
    }

    /// Sessions in onboarding, or without a language, go to the onboarding
    /// graph whatever language they carry. Everything else goes to the
    /// service graph in the session's language.
    pub fn resolve(&self, session: &SessionState) -> Route<'_> {
        let onboarding = session.step.is_some_and(|s| s.is_onboarding());
        match session.language {
            Some(language) if !onboarding => Route {
                graph: &self.service,
                handler: self.service.resolve(session.step),
                language,
            },
            stale => Route {
                graph: &self.onboarding,
                handler: self.onboarding.resolve(session.step),
                language: stale.unwrap_or(Language::DEFAULT),
            },
        }
    }

    /// After a turn that changed the language, move to the main menu unless
    /// the turn ended in onboarding, so the next step is never read against
    /// the previous language's prompts.
    pub fn reconcile(before: &SessionState, mut after: SessionState) -> SessionState {
        let changed = before.language != after.language && after.language.is_some();
        let onboarding = after.step.is_some_and(|s| s.is_onboarding());
        if changed && !onboarding && after.step != Some(Step::MainMenu) {
            tracing::debug!(
                identity = %after.identity,
                step = ?after.step,
                "Language changed; resetting to main menu"
            );
            after.step = Some(Step::MainMenu);
        }
        after
    }
}
