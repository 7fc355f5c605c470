//! Persistence layer: libSQL-backed storage for sessions, quotes and bookings.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{RecordStore, SessionStore};
