//! Defines the transaction store trait, the boundary between the service and
//! the database.

use crate::{
    transaction::{Transaction, TransactionBuilder, TransactionId},
    user::UserId,
};

/// The kinds of failure a [TransactionStore] can report.
///
/// Implementations translate driver specific errors into these variants so
/// that callers never need to inspect database error codes.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StoreError {
    /// A transaction with the same ID is already stored.
    #[error("a transaction with the ID {0} already exists")]
    DuplicateTransactionId(TransactionId),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// An unhandled/unexpected database error.
    #[error("an unexpected SQL error occurred: {0}")]
    Sql(String),
}

/// Handles the creation and retrieval of transactions.
pub trait TransactionStore: Clone + Send + Sync + 'static {
    /// Store a new transaction.
    ///
    /// # Errors
    /// Returns [StoreError::DuplicateTransactionId] if the builder's ID is
    /// already taken.
    fn create(&self, builder: TransactionBuilder) -> Result<Transaction, StoreError>;

    /// The sum of all transaction amounts for `user_id`, zero if there are none.
    fn balance(&self, user_id: &UserId) -> Result<f64, StoreError>;

    /// Retrieve a window of the transactions for `user_id`, most recent first.
    fn history(
        &self,
        user_id: &UserId,
        query: HistoryQuery,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// The total number of transactions for `user_id`.
    fn count(&self, user_id: &UserId) -> Result<u64, StoreError>;

    /// A window of `user_id`'s transactions together with their total count.
    ///
    /// The default runs [TransactionStore::history] and
    /// [TransactionStore::count] separately, so a concurrent insert may land
    /// between the two. Implementations should override it to read both from
    /// the same snapshot.
    fn history_page(
        &self,
        user_id: &UserId,
        query: HistoryQuery,
    ) -> Result<(Vec<Transaction>, u64), StoreError> {
        let transactions = self.history(user_id, query)?;
        let total = self.count(user_id)?;

        Ok((transactions, total))
    }
}

/// Defines which transactions are fetched by [TransactionStore::history].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Selects up to `limit` transactions.
    pub limit: u64,
    /// The number of transactions to skip.
    pub offset: u64,
}
