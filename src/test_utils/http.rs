use axum::{
    body::{Body, to_bytes},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;
use serde::de::DeserializeOwned;

use crate::{
    app_state::{SQLAppState, create_app_state},
    envelope::Envelope,
};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    let content_type_header = response
        .headers()
        .get("content-type")
        .expect("content-type header missing");
    assert_eq!(content_type_header, content_type);
}

pub(crate) async fn parse_envelope<T: DeserializeOwned>(response: Response<Body>) -> Envelope<T> {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not a JSON envelope")
}

/// An app state backed by a fresh in-memory database.
pub(crate) fn get_test_state() -> SQLAppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    create_app_state(connection, Default::default()).expect("Could not create app state")
}
