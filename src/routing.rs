//! Application router configuration.

use std::any::Any;

use axum::{
    Router, middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::{
    AppState, Error, endpoints,
    logging::logging_middleware,
    transaction::{
        TransactionStore, add_transaction_endpoint, get_balance_endpoint, get_history_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every response is a JSON envelope, including those for unknown routes and
/// unsupported methods. Panicking handlers are caught and answered with an
/// envelope as well.
pub fn build_router<T>(state: AppState<T>) -> Router
where
    T: TransactionStore,
{
    Router::new()
        .route(endpoints::TRANSACTION, post(add_transaction_endpoint::<T>))
        .route(endpoints::BALANCE, get(get_balance_endpoint::<T>))
        .route(endpoints::HISTORY, get(get_history_endpoint::<T>))
        .fallback(get_404_not_found)
        .method_not_allowed_fallback(get_405_method_not_allowed)
        .layer(middleware::from_fn(logging_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}

async fn get_405_method_not_allowed() -> Response {
    Error::MethodNotAllowed.into_response()
}

/// Convert a panic from a request handler into an error envelope.
pub(crate) fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic message".to_owned()
    };

    Error::Internal(details).into_response()
}
