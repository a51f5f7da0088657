//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row, types::Type};

use crate::{
    transaction::{
        HistoryQuery, StoreError, Transaction, TransactionBuilder, TransactionStore,
        core::{from_unix_micros, to_unix_micros},
    },
    user::UserId,
};

/// Stores transactions in a SQLite database.
///
/// The table must exist before the store is used, see
/// [initialize](crate::db::initialize).
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            StoreError::DatabaseLock
        })
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", error);
        StoreError::Sql(error.to_string())
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Insert a new transaction into the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [StoreError::DuplicateTransactionId] if the transaction ID is already in use,
    /// - [StoreError::DatabaseLock] if the database lock is poisoned,
    /// - or [StoreError::Sql] if there is some other SQL error.
    fn create(&self, builder: TransactionBuilder) -> Result<Transaction, StoreError> {
        let connection = self.connection()?;

        let transaction = connection
            .prepare(
                "INSERT INTO transactions (user_id, amount, transaction_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING user_id, amount, transaction_id, created_at",
            )?
            .query_row(
                (
                    builder.user_id.as_str(),
                    builder.amount,
                    builder.transaction_id,
                    to_unix_micros(builder.created_at),
                ),
                map_transaction_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: _,
                        extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                    },
                    _,
                ) => StoreError::DuplicateTransactionId(builder.transaction_id),
                error => error.into(),
            })?;

        Ok(transaction)
    }

    fn balance(&self, user_id: &UserId) -> Result<f64, StoreError> {
        let balance = self.connection()?.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM transactions WHERE user_id = ?1",
            (user_id.as_str(),),
            |row| row.get(0),
        )?;

        Ok(balance)
    }

    /// Ties on `created_at` are broken by insertion order, so the most
    /// recently inserted row still comes first.
    fn history(
        &self,
        user_id: &UserId,
        query: HistoryQuery,
    ) -> Result<Vec<Transaction>, StoreError> {
        query_history(&*self.connection()?, user_id, query)
    }

    fn count(&self, user_id: &UserId) -> Result<u64, StoreError> {
        query_count(&*self.connection()?, user_id)
    }

    /// Both queries run inside one SQL transaction while holding the
    /// connection lock, so the total always describes the returned page.
    fn history_page(
        &self,
        user_id: &UserId,
        query: HistoryQuery,
    ) -> Result<(Vec<Transaction>, u64), StoreError> {
        let mut connection = self.connection()?;
        let transaction = connection.transaction()?;

        let transactions = query_history(&transaction, user_id, query)?;
        let total = query_count(&transaction, user_id)?;

        transaction.commit()?;

        Ok((transactions, total))
    }
}

fn query_history(
    connection: &Connection,
    user_id: &UserId,
    query: HistoryQuery,
) -> Result<Vec<Transaction>, StoreError> {
    let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

    connection
        .prepare(
            "SELECT user_id, amount, transaction_id, created_at FROM transactions
             WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3",
        )?
        .query_map((user_id.as_str(), limit, offset), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(StoreError::from))
        .collect()
}

fn query_count(connection: &Connection, user_id: &UserId) -> Result<u64, StoreError> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM transactions WHERE user_id = ?1",
        (user_id.as_str(),),
        |row| row.get(0),
    )?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // created_at holds microseconds since the Unix epoch (UTC).
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                user_id TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                transaction_id TEXT NOT NULL UNIQUE,
                created_at INTEGER NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_created
            ON transactions(user_id, created_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let user_id: String = row.get(0)?;
    let amount = row.get(1)?;
    let transaction_id = row.get(2)?;
    let created_at: i64 = row.get(3)?;
    let created_at = from_unix_micros(created_at).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Integer, Box::new(error))
    })?;

    Ok(Transaction {
        transaction_id,
        user_id: UserId::new(user_id),
        amount,
        created_at,
    })
}
