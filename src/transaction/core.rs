//! Defines the core data models for transactions.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::user::UserId;

// ============================================================================
// MODELS
// ============================================================================

/// A newtype wrapper for the globally unique transaction ID.
///
/// Transaction IDs are generated by the server when a transaction is
/// recorded, clients never supply them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Generate a new random transaction ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl ToSql for TransactionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for TransactionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Uuid::parse_str(text)
            .map(Self)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A deposit into a user's ledger.
///
/// Transactions are immutable once recorded. To create a new `Transaction`,
/// use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The globally unique ID of the transaction.
    pub transaction_id: TransactionId,
    /// The user whose ledger the transaction belongs to.
    pub user_id: UserId,
    /// The amount of money deposited, always greater than zero.
    pub amount: f64,
    /// When the server recorded the transaction.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction with a fresh ID, stamped with the current time.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(user_id: UserId, amount: f64) -> TransactionBuilder {
        TransactionBuilder {
            transaction_id: TransactionId::new(),
            user_id,
            amount,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The defaults set by [Transaction::build] are what the service uses, the
/// setters exist so that tests can pin IDs and timestamps.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The ID the transaction will be stored under.
    pub transaction_id: TransactionId,
    /// The owner of the transaction.
    pub user_id: UserId,
    /// The deposited amount.
    pub amount: f64,
    /// The creation time of the transaction.
    pub created_at: OffsetDateTime,
}

impl TransactionBuilder {
    /// Set the transaction ID.
    pub fn transaction_id(mut self, transaction_id: TransactionId) -> Self {
        self.transaction_id = transaction_id;
        self
    }

    /// Set the creation time.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

// ============================================================================
// TIMESTAMPS
// ============================================================================

/// Convert `date_time` to whole microseconds since the Unix epoch.
///
/// Timestamps are stored as integers so that the database sorts them
/// chronologically, sub-microsecond precision is dropped.
pub fn to_unix_micros(date_time: OffsetDateTime) -> i64 {
    (date_time.unix_timestamp_nanos() / 1_000) as i64
}

/// Convert microseconds since the Unix epoch to a UTC date-time.
pub fn from_unix_micros(micros: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000)
}
