//! Defines the endpoint for getting a user's balance.
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    envelope::Envelope,
    transaction::{TransactionService, TransactionStore},
    user::{UserId, UserPath},
};

/// The balance payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// The user the balance belongs to.
    pub user_id: UserId,
    /// The sum of all the user's transactions.
    pub balance: f64,
}

/// A route handler for getting the balance of the user in the path.
pub async fn get_balance_endpoint<T>(
    State(service): State<TransactionService<T>>,
    UserPath(user_id): UserPath,
) -> Result<Envelope<Balance>, Error>
where
    T: TransactionStore,
{
    let balance = service.get_balance(&user_id)?;

    let message = format!("User {user_id} has a balance of ${balance}");

    Ok(Envelope::success(message, Balance { user_id, balance }))
}
