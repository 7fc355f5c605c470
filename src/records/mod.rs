//! Quote and booking records, addressed by generated reference.

pub mod model;
pub mod reference;

pub use model::{Booking, Quote, RecordStatus};
