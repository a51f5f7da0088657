//! Defines the endpoint for listing a user's transaction history.
use axum::extract::{Query, State, rejection::QueryRejection};
use serde::Deserialize;

use crate::{
    Error,
    envelope::Envelope,
    transaction::{Transaction, TransactionService, TransactionStore},
    user::UserPath,
};

/// The query parameters for the history endpoint.
///
/// `page` is kept as raw text so that invalid values fall back to the first
/// page instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    /// The 1-based page number.
    pub page: Option<String>,
}

/// A route handler for listing the transactions of the user in the path,
/// most recent first.
///
/// A user without transactions, or a page past the end, yields an empty list.
pub async fn get_history_endpoint<T>(
    State(service): State<TransactionService<T>>,
    UserPath(user_id): UserPath,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Envelope<Vec<Transaction>>, Error>
where
    T: TransactionStore,
{
    let params = params
        .map(|Query(params)| params)
        .unwrap_or_else(|rejection| {
            tracing::debug!("ignoring invalid query string: {rejection}");
            HistoryParams::default()
        });
    let page = service
        .pagination_config()
        .parse_page(params.page.as_deref());
    tracing::debug!("getting page {page} of transactions for user {user_id}");

    let history = service.get_history(&user_id, page)?;

    let message = format!(
        "User {user_id} has {} transactions, showing page {}",
        history.total, history.page
    );

    Ok(Envelope::success(message, history.transactions))
}
