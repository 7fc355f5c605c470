use async_trait::async_trait;

use super::main_menu;
use crate::error::FlowError;
use crate::flow::graph::{FlowContext, StepHandler, Transition};
use crate::flow::input::menu_choice;
use crate::flow::prompts::Prompt;
use crate::flow::{Language, Step};
use crate::session::SessionState;

/// Any input gets the welcome message and the language menu.
pub struct Welcome;

#[async_trait]
impl StepHandler for Welcome {
    fn step(&self) -> Step {
        Step::Welcome
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        _input: &str,
        session: SessionState,
    ) -> Result<Transition, FlowError> {
        let greeting = ctx.render(
            Prompt::Welcome,
            &[("business", ctx.settings.business_name.as_str())],
        );
        Ok(Transition::to(session.at(Step::SelectLanguage)).say(greeting))
    }
}

pub struct SelectLanguage;

#[async_trait]
impl StepHandler for SelectLanguage {
    fn step(&self) -> Step {
        Step::SelectLanguage
    }

    async fn handle(
        &self,
        ctx: &FlowContext<'_>,
        input: &str,
        mut session: SessionState,
    ) -> Result<Transition, FlowError> {
        let Some(language) = menu_choice(input, 3).and_then(Language::from_menu_option) else {
            return Ok(Transition::to(session).say(ctx.text(Prompt::LanguageMenu)));
        };

        tracing::info!(identity = %session.identity, %language, "Language selected");
        session.language = Some(language);
        // The menu goes out in the language just chosen.
        let chosen = FlowContext { language, ..*ctx };
        Ok(main_menu(&chosen, session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::handlers::testing::{CUSTOMER, Fixture, assert_idempotent_rejection};

    #[tokio::test]
    async fn welcome_sends_one_message_and_asks_for_language() {
        let fx = Fixture::new().await;
        let out = fx.run(&Welcome, "anything at all", SessionState::new(CUSTOMER)).await;
        assert_eq!(out.session.step, Some(Step::SelectLanguage));
        assert_eq!(out.replies.len(), 1);
        assert!(out.replies[0].text.contains("Borehole Co"));
        assert!(out.replies[0].text.contains("isiNdebele"));
    }

    #[tokio::test]
    async fn choosing_english_opens_main_menu() {
        let fx = Fixture::new().await;
        let session = SessionState::new(CUSTOMER).at(Step::SelectLanguage);
        let out = fx.run(&SelectLanguage, "1", session).await;
        assert_eq!(out.session.language, Some(Language::English));
        assert_eq!(out.session.step, Some(Step::MainMenu));
        assert!(out.replies[0].text.starts_with("Main Menu"));
    }

    #[tokio::test]
    async fn menu_is_sent_in_the_chosen_language() {
        let fx = Fixture::new().await;
        let session = SessionState::new(CUSTOMER).at(Step::SelectLanguage);
        let out = fx.run(&SelectLanguage, "2", session).await;
        assert_eq!(out.session.language, Some(Language::Shona));
        assert!(out.replies[0].text.starts_with("Menyu Huru"));

        let session = SessionState::new(CUSTOMER).at(Step::SelectLanguage);
        let out = fx.run(&SelectLanguage, " 3 ", session).await;
        assert_eq!(out.session.language, Some(Language::Ndebele));
        assert!(out.replies[0].text.starts_with("Imenyu Enkulu"));
    }

    #[tokio::test]
    async fn invalid_language_choice_repeats_menu() {
        let fx = Fixture::new().await;
        let session = SessionState::new(CUSTOMER).at(Step::SelectLanguage);
        for input in ["", "4", "english", "01"] {
            assert_idempotent_rejection(&fx, &SelectLanguage, input, session.clone()).await;
        }
    }
}
