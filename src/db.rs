/*! Sets up the application's database. */

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::transaction::{StoreError, create_transaction_table};

/// Create the tables for the domain models if they do not exist yet.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), StoreError> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
