//! Centralized helpers for HTTP error responses returned before a WebSocket is accepted.
//!
//! Use these helpers to ensure all error messages are consistent, explicit, and include a code and context.
use actix_web::{HttpResponse, http::StatusCode};

use crate::server::error::MatchError;

/// Returns an HTTP error response with a JSON body.
///
/// # Arguments
/// - `code`: Unique error code.
/// - `message`: Human-readable error message.
/// - `context`: Optional context string.
/// - `status`: HTTP status code.
pub fn http_error_response(
    code: &str,
    message: &str,
    context: Option<&str>,
    status: StatusCode,
) -> HttpResponse {
    let body = serde_json::json!({
        "error": {
            "code": code,
            "message": message,
            "context": context.unwrap_or(""),
        }
    });
    HttpResponse::build(status).json(body)
}

/// HTTP status used when a connection is rejected with `err`.
///
/// `Full` and `AlreadyInMatch` are policy violations and map to 403.
pub fn status_for(err: &MatchError) -> StatusCode {
    match err {
        MatchError::NotFound => StatusCode::NOT_FOUND,
        MatchError::Full | MatchError::AlreadyInMatch(_) => StatusCode::FORBIDDEN,
        MatchError::Disconnected => StatusCode::BAD_REQUEST,
        MatchError::Retired | MatchError::InternalRace(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Returns the HTTP rejection for a domain error.
pub fn match_error_response(err: &MatchError, context: Option<&str>) -> HttpResponse {
    http_error_response(err.code(), &err.to_string(), context, status_for(err))
}

/// Returns the rejection sent when the `player` query parameter is absent.
pub fn missing_player_response() -> HttpResponse {
    http_error_response(
        "MISSING_PLAYER",
        "Missing player identity",
        None,
        StatusCode::BAD_REQUEST,
    )
}
