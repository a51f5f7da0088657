//! The transaction operations, independent of HTTP.

use axum::extract::FromRef;

use crate::{
    AppState, Error,
    pagination::PaginationConfig,
    transaction::{StoreError, Transaction, TransactionStore},
    user::UserId,
};

/// Records transactions and derives balances and history from a [TransactionStore].
///
/// The service holds no state of its own between requests.
#[derive(Debug, Clone)]
pub struct TransactionService<T>
where
    T: TransactionStore,
{
    transaction_store: T,
    pagination_config: PaginationConfig,
}

/// One page of a user's transaction history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    /// The transactions on the page, most recent first.
    pub transactions: Vec<Transaction>,
    /// The 1-based page number that was served.
    pub page: u64,
    /// The maximum number of transactions on a page.
    pub page_size: u64,
    /// The number of transactions the user has across all pages.
    pub total: u64,
}

impl<T> TransactionService<T>
where
    T: TransactionStore,
{
    /// Create a new service backed by `transaction_store`.
    pub fn new(transaction_store: T, pagination_config: PaginationConfig) -> Self {
        Self {
            transaction_store,
            pagination_config,
        }
    }

    /// The config used to page through transaction history.
    pub fn pagination_config(&self) -> &PaginationConfig {
        &self.pagination_config
    }

    /// Record a deposit of `amount` for `user_id`.
    ///
    /// A fresh transaction ID and the current time are assigned to the new
    /// transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if `amount` is not a finite number greater than zero,
    /// - [Error::DuplicateTransaction] if the generated ID is already in use,
    /// - or [Error::InsertTransaction] if the store failed for any other reason.
    pub fn add_transaction(&self, user_id: UserId, amount: f64) -> Result<Transaction, Error> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidAmount(amount));
        }

        let builder = Transaction::build(user_id, amount);
        tracing::info!("recording transaction {builder:?}");

        self.transaction_store
            .create(builder)
            .map_err(|error| match error {
                StoreError::DuplicateTransactionId(_) => {
                    Error::DuplicateTransaction(error.to_string())
                }
                error => Error::InsertTransaction(error.to_string()),
            })
    }

    /// The sum of all of `user_id`'s transactions.
    ///
    /// A user without transactions has a balance of zero.
    ///
    /// # Errors
    /// Returns an [Error::GetBalance] if the store query failed or if the sum
    /// overflowed to a non-finite number.
    pub fn get_balance(&self, user_id: &UserId) -> Result<f64, Error> {
        let balance = self
            .transaction_store
            .balance(user_id)
            .map_err(|error| Error::GetBalance(error.to_string()))?;

        if !balance.is_finite() {
            return Err(Error::GetBalance(format!(
                "the balance of user {user_id} is too large to represent"
            )));
        }

        Ok(balance)
    }

    /// Get `page` of `user_id`'s transactions, most recent first.
    ///
    /// Pages past the end are empty rather than an error.
    ///
    /// # Errors
    /// Returns an [Error::GetHistory] if a store query failed.
    pub fn get_history(&self, user_id: &UserId, page: u64) -> Result<HistoryPage, Error> {
        let query = self.pagination_config.history_query(page);

        let (transactions, total) = self
            .transaction_store
            .history_page(user_id, query)
            .map_err(|error| Error::GetHistory(error.to_string()))?;

        Ok(HistoryPage {
            transactions,
            page,
            page_size: self.pagination_config.page_size,
            total,
        })
    }
}

impl<T> FromRef<AppState<T>> for TransactionService<T>
where
    T: TransactionStore,
{
    fn from_ref(state: &AppState<T>) -> Self {
        Self::new(
            state.transaction_store.clone(),
            state.pagination_config.clone(),
        )
    }
}

#[cfg(test)]
mod transaction_service_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        pagination::PaginationConfig,
        transaction::{
            HistoryQuery, SQLiteTransactionStore, StoreError, Transaction, TransactionBuilder,
            TransactionStore,
        },
        user::UserId,
    };

    use super::TransactionService;

    fn get_test_service() -> TransactionService<SQLiteTransactionStore> {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)));

        TransactionService::new(store, PaginationConfig::default())
    }

    /// A store whose every transaction ID is already taken.
    #[derive(Debug, Clone, Default)]
    struct CollidingStore {
        insert_attempts: Arc<Mutex<u32>>,
    }

    impl TransactionStore for CollidingStore {
        fn create(&self, builder: TransactionBuilder) -> Result<Transaction, StoreError> {
            *self.insert_attempts.lock().unwrap() += 1;
            Err(StoreError::DuplicateTransactionId(builder.transaction_id))
        }

        fn balance(&self, _user_id: &UserId) -> Result<f64, StoreError> {
            Ok(0.0)
        }

        fn history(
            &self,
            _user_id: &UserId,
            _query: HistoryQuery,
        ) -> Result<Vec<Transaction>, StoreError> {
            Ok(Vec::new())
        }

        fn count(&self, _user_id: &UserId) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    /// A store that fails every query.
    #[derive(Debug, Clone)]
    struct BrokenStore;

    impl TransactionStore for BrokenStore {
        fn create(&self, _builder: TransactionBuilder) -> Result<Transaction, StoreError> {
            Err(StoreError::Sql("disk I/O error".to_owned()))
        }

        fn balance(&self, _user_id: &UserId) -> Result<f64, StoreError> {
            Err(StoreError::DatabaseLock)
        }

        fn history(
            &self,
            _user_id: &UserId,
            _query: HistoryQuery,
        ) -> Result<Vec<Transaction>, StoreError> {
            Err(StoreError::Sql("no such table: transactions".to_owned()))
        }

        fn count(&self, _user_id: &UserId) -> Result<u64, StoreError> {
            Err(StoreError::Sql("no such table: transactions".to_owned()))
        }
    }

    #[test]
    fn add_transaction_stores_amount_for_user() {
        let service = get_test_service();
        let user_id = UserId::new("alice");

        let transaction = service.add_transaction(user_id.clone(), 42.5).unwrap();

        assert_eq!(transaction.user_id, user_id);
        assert_eq!(transaction.amount, 42.5);
        assert_eq!(service.get_balance(&user_id).unwrap(), 42.5);
    }

    #[test]
    fn add_transaction_rejects_non_positive_amounts() {
        let service = get_test_service();
        let user_id = UserId::new("alice");

        for amount in [0.0, -0.0, -1.0, -1e-9, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = service.add_transaction(user_id.clone(), amount);

            assert!(
                matches!(result, Err(Error::InvalidAmount(_))),
                "want invalid amount error for {amount}, got {result:?}"
            );
        }

        assert_eq!(service.get_history(&user_id, 1).unwrap().total, 0);
    }

    #[test]
    fn add_transaction_reports_duplicate_ids() {
        let store = CollidingStore::default();
        let service = TransactionService::new(store.clone(), PaginationConfig::default());

        let result = service.add_transaction(UserId::new("alice"), 10.0);

        assert!(
            matches!(result, Err(Error::DuplicateTransaction(_))),
            "want duplicate transaction error, got {result:?}"
        );
        assert_eq!(*store.insert_attempts.lock().unwrap(), 1, "should not retry");
    }

    #[test]
    fn add_transaction_does_not_call_store_for_invalid_amount() {
        let store = CollidingStore::default();
        let service = TransactionService::new(store.clone(), PaginationConfig::default());

        let _ = service.add_transaction(UserId::new("alice"), -3.0);

        assert_eq!(*store.insert_attempts.lock().unwrap(), 0);
    }

    #[test]
    fn store_failures_map_to_operation_errors() {
        let service = TransactionService::new(BrokenStore, PaginationConfig::default());
        let user_id = UserId::new("alice");

        assert_eq!(
            service.add_transaction(user_id.clone(), 1.0),
            Err(Error::InsertTransaction(
                "an unexpected SQL error occurred: disk I/O error".to_owned()
            ))
        );
        assert_eq!(
            service.get_balance(&user_id),
            Err(Error::GetBalance(
                "could not acquire the database lock".to_owned()
            ))
        );
        assert!(matches!(
            service.get_history(&user_id, 1),
            Err(Error::GetHistory(_))
        ));
    }

    #[test]
    fn balance_is_zero_for_new_user() {
        let service = get_test_service();

        assert_eq!(service.get_balance(&UserId::new("nobody")).unwrap(), 0.0);
    }

    #[test]
    fn balance_sums_transactions() {
        let service = get_test_service();
        let user_id = UserId::new("alice");
        service.add_transaction(user_id.clone(), 10.0).unwrap();
        service.add_transaction(user_id.clone(), 5.5).unwrap();

        assert_eq!(service.get_balance(&user_id).unwrap(), 15.5);
    }

    #[test]
    fn balance_overflow_is_an_error() {
        let service = get_test_service();
        let user_id = UserId::new("alice");
        service.add_transaction(user_id.clone(), 1.7e308).unwrap();
        service.add_transaction(user_id.clone(), 1.7e308).unwrap();

        let result = service.get_balance(&user_id);

        assert_eq!(
            result,
            Err(Error::GetBalance(
                "the balance of user alice is too large to represent".to_owned()
            ))
        );
    }

    #[test]
    fn history_is_empty_for_new_user() {
        let service = get_test_service();

        let page = service.get_history(&UserId::new("nobody"), 1).unwrap();

        assert!(page.transactions.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn history_pages_hold_at_most_page_size() {
        let service = get_test_service();
        let user_id = UserId::new("alice");
        for i in 1..=12 {
            service.add_transaction(user_id.clone(), f64::from(i)).unwrap();
        }

        let first = service.get_history(&user_id, 1).unwrap();
        let second = service.get_history(&user_id, 2).unwrap();

        assert_eq!(first.transactions.len(), 10);
        assert_eq!(second.transactions.len(), 2);
        assert_eq!(first.total, 12);
        assert_eq!(first.page_size, 10);
        assert!(
            first
                .transactions
                .iter()
                .all(|transaction| !second.transactions.contains(transaction)),
            "pages should not overlap"
        );
    }
}
