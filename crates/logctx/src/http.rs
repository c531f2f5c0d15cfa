//! HTTP endpoint for viewing and changing the global log level at runtime.
//!
//! `GET` answers `{"level":"info"}`. `PUT` takes the same JSON shape, or a
//! `level=<name>` form (body or query string), and answers with the new level. Failures answer
//! `{"error":"..."}`.

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{LogCtxError, Result};
use crate::global::l;
use crate::level::Severity;

#[derive(Serialize)]
struct LevelStatus {
    level: Severity,
}

#[derive(Serialize)]
struct ErrorStatus {
    error: String,
}

#[derive(Deserialize)]
struct LevelRequest {
    level: Option<String>,
}

/// Axum handler serving the level controller of the current global logger.
pub async fn http_level_change(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let controller = l().level_handle().clone();
    match method {
        Method::GET => level_status(controller.level()),
        Method::PUT => match decode_level(&uri, &headers, &body) {
            Ok(level) => {
                controller.set_level(level);
                level_status(level)
            }
            Err(err) => error_status(StatusCode::BAD_REQUEST, err.to_string()),
        },
        _ => error_status(
            StatusCode::METHOD_NOT_ALLOWED,
            "Only GET and PUT are supported.".to_string(),
        ),
    }
}

/// A router serving [`http_level_change`] at `path`.
pub fn level_router<S>(path: &str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(path, any(http_level_change))
}

fn form_level(form: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(form)
        .find(|(key, _)| key == "level")
        .map(|(_, value)| value.into_owned())
}

fn decode_level(uri: &Uri, headers: &HeaderMap, body: &[u8]) -> Result<Severity> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    // Body values take precedence over the query string
    let requested = if is_form {
        form_level(body)
            .or_else(|| uri.query().and_then(|query| form_level(query.as_bytes())))
    } else {
        let request: LevelRequest =
            serde_json::from_slice(body).map_err(|e| LogCtxError::LevelBody(e.to_string()))?;
        request.level
    };

    requested
        .ok_or_else(|| LogCtxError::LevelBody("must specify logging level".to_string()))?
        .parse()
}

fn level_status(level: Severity) -> Response {
    (StatusCode::OK, Json(LevelStatus { level })).into_response()
}

fn error_status(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorStatus { error })).into_response()
}
