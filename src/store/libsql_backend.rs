//! libSQL backend: async `SessionStore` and `RecordStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::DatabaseError;
use crate::records::{Booking, Quote, RecordStatus};
use crate::session::{SessionState, SubRecord};
use crate::store::migrations;
use crate::store::traits::{RecordStore, SessionStore};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests and the console REPL).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    /// Run all pending schema migrations.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str, id: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    warn!(id = id, value = s, "Unreadable record timestamp; using minimum time");
    DateTime::<Utc>::MIN_UTC
}

fn parse_decimal(s: Option<String>) -> Option<Decimal> {
    s.and_then(|s| s.parse().ok())
}

fn parse_details(s: &str, id: &str) -> SubRecord {
    serde_json::from_str(s).unwrap_or_else(|e| {
        warn!(id = id, error = %e, "Unreadable record details; using empty record");
        SubRecord::default()
    })
}

fn parse_status(s: &str) -> RecordStatus {
    s.parse().unwrap_or(RecordStatus::Pending)
}

/// Convert `Option<String>` to libsql Value.
fn opt_text_owned(s: Option<String>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s),
        None => libsql::Value::Null,
    }
}

fn opt_integer(v: Option<i64>) -> libsql::Value {
    match v {
        Some(v) => libsql::Value::Integer(v),
        None => libsql::Value::Null,
    }
}

/// Map an insert failure, separating duplicate keys from other errors.
fn insert_error(op: &str, e: libsql::Error) -> DatabaseError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        DatabaseError::Constraint(format!("{op}: {message}"))
    } else {
        DatabaseError::Query(format!("{op}: {message}"))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

/// Map a libsql Row to a Quote.
///
/// Column order matches QUOTE_COLUMNS.
fn row_to_quote(row: &libsql::Row) -> Result<Quote, libsql::Error> {
    let id: String = row.get(0)?;
    let details: String = row.get(2)?;
    let status: String = row.get(5)?;
    let created: String = row.get(6)?;
    let updated: String = row.get(7)?;

    Ok(Quote {
        details: parse_details(&details, &id),
        identity: row.get(1)?,
        estimate: parse_decimal(row.get(3).ok()),
        offer_amount: parse_decimal(row.get(4).ok()),
        status: parse_status(&status),
        created_at: parse_datetime(&created, &id),
        updated_at: parse_datetime(&updated, &id),
        id,
    })
}

/// Map a libsql Row to a Booking.
///
/// Column order matches BOOKING_COLUMNS.
fn row_to_booking(row: &libsql::Row) -> Result<Booking, libsql::Error> {
    let id: String = row.get(0)?;
    let details: String = row.get(2)?;
    let status: String = row.get(4)?;
    let created: String = row.get(5)?;
    let updated: String = row.get(6)?;

    Ok(Booking {
        details: parse_details(&details, &id),
        identity: row.get(1)?,
        quote_id: row.get(3).ok(),
        status: parse_status(&status),
        created_at: parse_datetime(&created, &id),
        updated_at: parse_datetime(&updated, &id),
        id,
    })
}

// ── Trait implementations ───────────────────────────────────────────

const QUOTE_COLUMNS: &str =
    "id, identity, details, estimate, offer_amount, status, created_at, updated_at";

const BOOKING_COLUMNS: &str = "id, identity, details, quote_id, status, created_at, updated_at";

#[async_trait]
impl SessionStore for LibSqlBackend {
    async fn get_session(&self, identity: &str) -> Result<SessionState, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT state, expires_at FROM sessions WHERE identity = ?1",
                params![identity],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_session: {e}")))?;

        let row = match rows.next().await {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(SessionState::new(identity)),
            Err(e) => return Err(DatabaseError::Query(format!("get_session: {e}"))),
        };

        let expires_at: Option<i64> = row.get(1).ok();
        if let Some(expires_at) = expires_at
            && expires_at <= Utc::now().timestamp_millis()
        {
            debug!(identity = identity, "Session expired; starting fresh");
            return Ok(SessionState::new(identity));
        }

        let raw: String = row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("get_session: {e}")))?;
        match serde_json::from_str::<SessionState>(&raw) {
            Ok(mut state) => {
                if state.identity.is_empty() {
                    state.identity = identity.to_string();
                }
                Ok(state)
            }
            Err(e) => {
                warn!(identity = identity, error = %e, "Undecodable session; starting fresh");
                Ok(SessionState::new(identity))
            }
        }
    }

    async fn put_session(
        &self,
        identity: &str,
        state: &SessionState,
        ttl: Option<Duration>,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let value = to_json(state)?;
        let expires_at = ttl.map(|ttl| {
            now.timestamp_millis()
                .saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX))
        });

        self.conn()
            .execute(
                "INSERT INTO sessions (identity, state, expires_at, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (identity) DO UPDATE SET state = ?2, expires_at = ?3, updated_at = ?4",
                params![identity, value, opt_integer(expires_at), now.to_rfc3339()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("put_session: {e}")))?;

        debug!(identity = identity, step = ?state.step, "Session saved");
        Ok(())
    }

    async fn purge_expired_sessions(&self) -> Result<usize, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "DELETE FROM sessions WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                params![Utc::now().timestamp_millis()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("purge_expired_sessions: {e}")))?;
        if count > 0 {
            info!(count, "Purged expired sessions");
        }
        Ok(count as usize)
    }
}

#[async_trait]
impl RecordStore for LibSqlBackend {
    // ── Quotes ──────────────────────────────────────────────────────

    async fn insert_quote(&self, quote: &Quote) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO quotes (id, identity, details, estimate, offer_amount, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    quote.id.clone(),
                    quote.identity.clone(),
                    to_json(&quote.details)?,
                    opt_text_owned(quote.estimate.map(|d| d.to_string())),
                    opt_text_owned(quote.offer_amount.map(|d| d.to_string())),
                    quote.status.as_str(),
                    quote.created_at.to_rfc3339(),
                    quote.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| insert_error("insert_quote", e))?;

        info!(quote_id = %quote.id, identity = %quote.identity, "Quote created");
        Ok(())
    }

    async fn get_quote(&self, id: &str) -> Result<Option<Quote>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_quote: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_quote(&row)
                .map(Some)
                .map_err(|e| DatabaseError::Query(format!("get_quote row: {e}"))),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_quote: {e}"))),
        }
    }

    async fn update_quote(&self, quote: &Quote) -> Result<(), DatabaseError> {
        let count = self
            .conn()
            .execute(
                "UPDATE quotes SET status = ?2, offer_amount = ?3, updated_at = ?4 WHERE id = ?1",
                params![
                    quote.id.clone(),
                    quote.status.as_str(),
                    opt_text_owned(quote.offer_amount.map(|d| d.to_string())),
                    quote.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_quote: {e}")))?;

        if count == 0 {
            return Err(DatabaseError::NotFound {
                entity: "quote".to_string(),
                id: quote.id.clone(),
            });
        }
        debug!(quote_id = %quote.id, status = %quote.status, "Quote updated");
        Ok(())
    }

    // ── Bookings ────────────────────────────────────────────────────

    async fn insert_booking(&self, booking: &Booking) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO bookings (id, identity, details, quote_id, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    booking.id.clone(),
                    booking.identity.clone(),
                    to_json(&booking.details)?,
                    opt_text_owned(booking.quote_id.clone()),
                    booking.status.as_str(),
                    booking.created_at.to_rfc3339(),
                    booking.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| insert_error("insert_booking", e))?;

        info!(booking_id = %booking.id, identity = %booking.identity, "Booking created");
        Ok(())
    }

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_booking: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_booking(&row)
                .map(Some)
                .map_err(|e| DatabaseError::Query(format!("get_booking row: {e}"))),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_booking: {e}"))),
        }
    }

    async fn update_booking(&self, booking: &Booking) -> Result<(), DatabaseError> {
        let count = self
            .conn()
            .execute(
                "UPDATE bookings SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![
                    booking.id.clone(),
                    booking.status.as_str(),
                    booking.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_booking: {e}")))?;

        if count == 0 {
            return Err(DatabaseError::NotFound {
                entity: "booking".to_string(),
                id: booking.id.clone(),
            });
        }
        debug!(booking_id = %booking.id, status = %booking.status, "Booking updated");
        Ok(())
    }
}
