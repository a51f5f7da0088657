//! A small JSON API for an append-only ledger of user transactions.
//!
//! The API records deposits for a user, reports the user's balance and
//! lists the user's transaction history one page at a time. Transactions are
//! stored in a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod db;
pub mod endpoints;
mod envelope;
mod error;
mod logging;
mod pagination;
mod routing;
pub mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, SQLAppState, create_app_state};
pub use db::initialize as initialize_db;
pub use envelope::Envelope;
pub use error::Error;
pub use logging::{
    LOG_BODY_LENGTH_LIMIT, MAX_REQUEST_BODY_BYTES, add_tracing_layer, logging_middleware,
    module_from_path,
};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use user::{UserId, UserPath};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
