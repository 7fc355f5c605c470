//! Quote and booking records: persisted snapshots of finished transactions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::reference;
use crate::session::SubRecord;

/// Lifecycle status shared by quotes and bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Created, waiting for the customer or the team.
    Pending,
    /// Customer accepted the quoted estimate.
    Accepted,
    /// Customer proposed their own price.
    Offered,
    /// Customer cancelled.
    Cancelled,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Offered => "offered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "offered" => Ok(Self::Offered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown record status: {other}")),
        }
    }
}

/// A quote request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// 8-character reference.
    pub id: String,
    /// Customer identity the quote was made for.
    pub identity: String,
    /// Snapshot of the session's quote sub-record.
    pub details: SubRecord,
    /// Automatic estimate, when the depth could be read.
    pub estimate: Option<Decimal>,
    /// Customer's counter-offer, if any.
    pub offer_amount: Option<Decimal>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// New pending quote with a fresh reference.
    pub fn new(
        identity: impl Into<String>,
        details: SubRecord,
        estimate: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: reference::generate(),
            identity: identity.into(),
            details,
            estimate,
            offer_amount: None,
            status: RecordStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark accepted.
    pub fn accept(&mut self, now: DateTime<Utc>) {
        self.status = RecordStatus::Accepted;
        self.updated_at = now;
    }

    /// Record a counter-offer.
    pub fn offer(&mut self, amount: Decimal, now: DateTime<Utc>) {
        self.offer_amount = Some(amount);
        self.status = RecordStatus::Offered;
        self.updated_at = now;
    }
}

/// A service booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub identity: String,
    /// Snapshot of the session's booking sub-record.
    pub details: SubRecord,
    /// Quote this booking was made from, if any.
    pub quote_id: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        identity: impl Into<String>,
        details: SubRecord,
        quote_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: reference::generate(),
            identity: identity.into(),
            details,
            quote_id,
            status: RecordStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) {
        self.status = RecordStatus::Cancelled;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn new_quote_is_pending_with_reference() {
        let now = Utc::now();
        let quote = Quote::new("u1", SubRecord::new(), Some(dec!(1000)), now);
        assert_eq!(quote.status, RecordStatus::Pending);
        assert!(reference::normalize(&quote.id).is_some());
        assert_eq!(quote.created_at, quote.updated_at);
        assert!(quote.offer_amount.is_none());
    }

    #[test]
    fn offer_sets_amount_and_status() {
        let created = Utc::now();
        let mut quote = Quote::new("u1", SubRecord::new(), None, created);
        let later = created + chrono::Duration::minutes(5);
        quote.offer(dec!(850.50), later);
        assert_eq!(quote.status, RecordStatus::Offered);
        assert_eq!(quote.offer_amount, Some(dec!(850.50)));
        assert_eq!(quote.updated_at, later);
        assert_eq!(quote.created_at, created);
    }

    #[test]
    fn status_display_matches_serde() {
        for status in [
            RecordStatus::Pending,
            RecordStatus::Accepted,
            RecordStatus::Offered,
            RecordStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(format!("\"{status}\""), json);
            assert_eq!(status.as_str().parse::<RecordStatus>().unwrap(), status);
        }
    }
}
