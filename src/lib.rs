//! Service Bot: menu-driven conversational agent for a service business.

pub mod channels;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod flow;
pub mod llm;
pub mod records;
pub mod session;
pub mod store;
