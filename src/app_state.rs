//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    db::initialize,
    pagination::PaginationConfig,
    transaction::{SQLiteTransactionStore, StoreError, TransactionStore},
};

/// The state of the REST server.
///
/// The transaction store is passed in rather than held globally so that
/// tests can swap in their own implementation.
#[derive(Debug, Clone)]
pub struct AppState<T>
where
    T: TransactionStore,
{
    /// The config that controls how to page through transaction history.
    pub pagination_config: PaginationConfig,
    /// The store for managing user [transactions](crate::transaction::Transaction).
    pub transaction_store: T,
}

impl<T> AppState<T>
where
    T: TransactionStore,
{
    /// Create a new [AppState].
    pub fn new(pagination_config: PaginationConfig, transaction_store: T) -> Self {
        Self {
            pagination_config,
            transaction_store,
        }
    }
}

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SQLAppState = AppState<SQLiteTransactionStore>;

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// This function will modify the database by adding the transaction table if
/// it does not exist yet.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_app_state(
    db_connection: Connection,
    pagination_config: PaginationConfig,
) -> Result<SQLAppState, StoreError> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok(AppState::new(
        pagination_config,
        SQLiteTransactionStore::new(connection),
    ))
}
