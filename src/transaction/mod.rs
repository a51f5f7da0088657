//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The `TransactionStore` trait and its SQLite implementation
//! - The `TransactionService` that validates and runs the ledger operations
//! - The JSON route handlers for recording transactions, balances and history

mod balance_endpoint;
mod core;
mod create_endpoint;
mod history_endpoint;
mod service;
mod sqlite;
mod store;

pub use balance_endpoint::{Balance, get_balance_endpoint};
pub use core::{Transaction, TransactionBuilder, TransactionId};
pub use create_endpoint::{AddTransactionRequest, add_transaction_endpoint};
pub use history_endpoint::{HistoryParams, get_history_endpoint};
pub use service::{HistoryPage, TransactionService};
pub use sqlite::{SQLiteTransactionStore, create_transaction_table, map_transaction_row};
pub use store::{HistoryQuery, StoreError, TransactionStore};
