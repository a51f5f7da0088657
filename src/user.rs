//! The user identifier and the extractor that reads it from request paths.

use std::fmt::Display;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A newtype wrapper for string user IDs.
///
/// User IDs come straight from the request path and their format is not
/// validated, the wrapper only stops them being mixed up with other strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Extracts the user ID from routes shaped like `/{module}/{uid}/...`.
///
/// Rejections are rendered as JSON error envelopes instead of axum's plain
/// text responses.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPath(pub UserId);

impl<S> FromRequestParts<S> for UserPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((_module, uid)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::InvalidPath(rejection.body_text()))?;

        Ok(Self(UserId::new(uid)))
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, routing::get};
    use axum_test::TestServer;

    use super::{UserId, UserPath};

    async fn echo_user_id(UserPath(user_id): UserPath) -> String {
        user_id.to_string()
    }

    #[tokio::test]
    async fn extracts_user_id_from_path() {
        let app = Router::new().route("/{module}/{uid}/balance", get(echo_user_id));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.get("/wallet/alice/balance").await;

        response.assert_status_ok();
        response.assert_text("alice");
    }

    #[tokio::test]
    async fn decodes_percent_encoded_user_id() {
        let app = Router::new().route("/{module}/{uid}/balance", get(echo_user_id));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.get("/wallet/jane%20doe/balance").await;

        response.assert_text("jane doe");
    }

    #[test]
    fn serializes_as_plain_string() {
        let user_id = UserId::new("bob");

        let json = serde_json::to_string(&user_id).unwrap();

        assert_eq!(json, "\"bob\"");
    }
}
