//! Middleware for logging requests and responses.

use std::time::Instant;

use axum::{
    Router,
    body::Bytes,
    extract::{MatchedPath, Request},
    http::{HeaderMap, header::CONTENT_LENGTH},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::trace::TraceLayer;

use crate::Error;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level, followed by
/// the time taken to produce the response.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level.
///
/// Request bodies larger than [MAX_REQUEST_BODY_BYTES] are rejected with a
/// `413 Payload Too Large` envelope before they reach a handler.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let module = module_from_path(request.uri().path());
    let path = request.uri().path().to_owned();

    if declared_length(request.headers())
        .is_some_and(|length| length > MAX_REQUEST_BODY_BYTES)
    {
        return Error::PayloadTooLarge(MAX_REQUEST_BODY_BYTES).into_response();
    }

    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, MAX_REQUEST_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) if is_length_limit_error(&error) => {
            return Error::PayloadTooLarge(MAX_REQUEST_BODY_BYTES).into_response();
        }
        Err(error) => return Error::InvalidRequestBody(error.to_string()).into_response(),
    };
    log_request(&parts, &body_bytes);

    let request = Request::from_parts(parts, body_bytes.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return Error::Internal(error.to_string()).into_response();
        }
    };
    log_response(&parts, &body_bytes);

    tracing::info!(
        module = %module,
        path = %path,
        "Response time: {:.6}s",
        start_time.elapsed().as_secs_f64()
    );

    Response::from_parts(parts, body_bytes.into())
}

/// The upper-cased first segment of `path`, e.g. "WALLET" for "/wallet/alice/balance".
pub fn module_from_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

/// Wrap `router` in a layer that opens a span for each request.
pub fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();
            let module = module_from_path(uri.path());

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path, module = %module)
        })
        // By default, `TraceLayer` will log 5xx responses but the error
        // envelopes are already logged when they are created.
        .on_failure(());

    router.layer(tracing_layer)
}

/// The number of bytes of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body that is read into memory, the same as axum's
/// default body limit.
pub const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

// `to_bytes` reports an exceeded limit as an opaque error whose message is
// "length limit exceeded", e.g. for chunked bodies without a content length.
fn is_length_limit_error(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);

    while let Some(current) = source {
        if current.to_string() == "length limit exceeded" {
            return true;
        }
        source = current.source();
    }

    false
}

fn truncate_body(body: &[u8]) -> (String, bool) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        (
            String::from_utf8_lossy(&body[..LOG_BODY_LENGTH_LIMIT]).to_string(),
            true,
        )
    } else {
        (String::from_utf8_lossy(body).to_string(), false)
    }
}

fn log_request(parts: &axum::http::request::Parts, body: &Bytes) {
    let (display_text, truncated) = truncate_body(body);

    if truncated {
        tracing::info!(
            "Received request: {} {}\nbody: {display_text}...",
            parts.method,
            parts.uri
        );
        tracing::debug!("Full request body: {:?}", String::from_utf8_lossy(body));
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {display_text:?}",
            parts.method,
            parts.uri
        );
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &Bytes) {
    let (display_text, truncated) = truncate_body(body);

    if truncated {
        tracing::info!(
            "Sending response: {}\nbody: {display_text}...",
            parts.status
        );
        tracing::debug!("Full response body: {:?}", String::from_utf8_lossy(body));
    } else {
        tracing::info!("Sending response: {}\nbody: {display_text:?}", parts.status);
    }
}
