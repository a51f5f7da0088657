//! Defines the app level error type and its conversion to JSON error envelopes.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::envelope::Envelope;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body could not be parsed as the expected JSON.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// The path parameters could not be extracted from the request URI.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A transaction amount was zero, negative or not a finite number.
    ///
    /// Transactions are deposits, so only strictly positive amounts are
    /// accepted.
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    /// The generated transaction ID collided with an existing one.
    ///
    /// This is a business error rather than a database failure. Callers can
    /// use it to detect that the transaction was already recorded.
    #[error("{0}")]
    DuplicateTransaction(String),

    /// The transaction could not be stored.
    ///
    /// The error string should only be logged for debugging on the server or
    /// attached to the envelope's `error` field.
    #[error("could not insert transaction: {0}")]
    InsertTransaction(String),

    /// The balance query failed.
    #[error("could not compute balance: {0}")]
    GetBalance(String),

    /// The transaction history query failed.
    #[error("could not get transaction history: {0}")]
    GetHistory(String),

    /// The request body was larger than the given number of bytes.
    #[error("request body exceeds the limit of {0} bytes")]
    PayloadTooLarge(usize),

    /// The requested route does not exist.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The route exists but does not accept the request method.
    #[error("the request method is not supported for this resource")]
    MethodNotAllowed,

    /// An unexpected failure while handling a request, e.g. a panicking
    /// handler.
    #[error("internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// The HTTP status code and human readable message for the error.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            Error::InvalidRequestBody(_) => (StatusCode::BAD_REQUEST, "Invalid request body"),
            Error::InvalidPath(_) => (StatusCode::BAD_REQUEST, "Invalid request path"),
            Error::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "Amount must be positive"),
            Error::DuplicateTransaction(_) => (StatusCode::CONFLICT, "Duplicate transaction"),
            Error::InsertTransaction(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error inserting transaction",
            ),
            Error::GetBalance(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error getting balance"),
            Error::GetHistory(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error getting transaction history",
            ),
            Error::PayloadTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
            }
            Error::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            Error::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
            Error::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong, check the server logs for more details",
            ),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, message) = self.status_and_message();

        if status_code.is_server_error() {
            tracing::error!("{message}: {self}");
        } else {
            tracing::warn!("{message}: {self}");
        }

        Envelope::failure(status_code, message, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{envelope::Envelope, test_utils::parse_envelope};

    use super::Error;

    async fn into_envelope(error: Error) -> (StatusCode, Envelope<()>) {
        let response = error.into_response();
        let status = response.status();

        (status, parse_envelope(response).await)
    }

    #[tokio::test]
    async fn client_errors_are_bad_requests() {
        let (status, envelope) = into_envelope(Error::InvalidAmount(-5.0)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope.status, 400);
        assert_eq!(envelope.message, "Amount must be positive");
        assert_eq!(
            envelope.error.as_deref(),
            Some("amount must be a positive number, got -5")
        );
        assert_eq!(envelope.data, None);
    }

    #[tokio::test]
    async fn duplicate_transaction_is_conflict() {
        let (status, envelope) =
            into_envelope(Error::DuplicateTransaction("already exists".to_owned())).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(envelope.message, "Duplicate transaction");
        assert_eq!(envelope.error.as_deref(), Some("already exists"));
    }

    #[tokio::test]
    async fn oversized_body_is_payload_too_large() {
        let (status, envelope) = into_envelope(Error::PayloadTooLarge(1024)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(envelope.status, 413);
        assert_eq!(
            envelope.error.as_deref(),
            Some("request body exceeds the limit of 1024 bytes")
        );
    }

    #[tokio::test]
    async fn store_errors_keep_underlying_message() {
        let (status, envelope) =
            into_envelope(Error::InsertTransaction("disk I/O error".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(envelope.message, "Error inserting transaction");
        assert_eq!(
            envelope.error.as_deref(),
            Some("could not insert transaction: disk I/O error")
        );
    }
}
