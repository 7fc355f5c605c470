//! Session model: the typed per-customer state the dispatcher reads and
//! writes once per inbound message.

pub mod record;
pub mod state;

pub use record::{FieldValue, NOT_PROVIDED, SubRecord};
pub use state::{SessionState, keys};
