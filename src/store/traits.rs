//! Persistence traits: sessions by identity, records by reference.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::records::{Booking, Quote};
use crate::session::SessionState;

/// One session record per customer identity.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session for `identity`.
    ///
    /// A missing, expired or undecodable record yields a fresh session at the
    /// initial step. Only backend failures are errors.
    async fn get_session(&self, identity: &str) -> Result<SessionState, DatabaseError>;

    /// Replace the stored session for `identity`. `ttl` sets an expiry
    /// relative to now; `None` keeps the record until overwritten.
    async fn put_session(
        &self,
        identity: &str,
        state: &SessionState,
        ttl: Option<Duration>,
    ) -> Result<(), DatabaseError>;

    /// Delete expired sessions. Returns the number removed.
    async fn purge_expired_sessions(&self) -> Result<usize, DatabaseError>;
}

/// Quote and booking records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ── Quotes ──────────────────────────────────────────────────────

    /// Insert a new quote. A reference that already exists is
    /// `DatabaseError::Constraint`.
    async fn insert_quote(&self, quote: &Quote) -> Result<(), DatabaseError>;

    async fn get_quote(&self, id: &str) -> Result<Option<Quote>, DatabaseError>;

    /// Rewrite the mutable fields (status, offer, updated_at) of a quote.
    async fn update_quote(&self, quote: &Quote) -> Result<(), DatabaseError>;

    // ── Bookings ────────────────────────────────────────────────────

    /// Insert a new booking. A reference that already exists is
    /// `DatabaseError::Constraint`.
    async fn insert_booking(&self, booking: &Booking) -> Result<(), DatabaseError>;

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, DatabaseError>;

    /// Rewrite the status and updated_at of a booking.
    async fn update_booking(&self, booking: &Booking) -> Result<(), DatabaseError>;
}
