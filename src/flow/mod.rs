//! Conversation flow: steps, languages, prompts, handlers and routing.

pub mod graph;
pub mod handlers;
pub mod input;
pub mod language;
pub mod prompts;
pub mod router;
pub mod step;

pub use graph::{FlowContext, FlowGraph, Recipient, Reply, StepHandler, Transition};
pub use language::Language;
pub use prompts::Prompt;
pub use router::{LanguageRouter, Route};
pub use step::Step;
