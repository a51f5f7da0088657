//! Defines the endpoint for recording a new transaction.
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    envelope::Envelope,
    transaction::{Transaction, TransactionService, TransactionStore},
    user::UserPath,
};

/// The JSON body for recording a transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddTransactionRequest {
    /// The amount to deposit, must be greater than zero.
    pub amount: f64,
}

/// A route handler for recording a transaction for the user in the path.
///
/// Responds with a confirmation message and the stored transaction.
pub async fn add_transaction_endpoint<T>(
    State(service): State<TransactionService<T>>,
    UserPath(user_id): UserPath,
    body: Result<Json<AddTransactionRequest>, JsonRejection>,
) -> Result<Envelope<Transaction>, Error>
where
    T: TransactionStore,
{
    let Json(request) =
        body.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;

    let transaction = service.add_transaction(user_id, request.amount)?;

    let message = format!(
        "Transaction of ${} added for user {}",
        transaction.amount, transaction.user_id
    );

    Ok(Envelope::success(message, transaction))
}
