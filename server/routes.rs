use std::io::{Cursor, Read};
use serde_json::{json, Value};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::handlers::predict::Upload;
use crate::state::{ServerState, SharedState};
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

/// Every response may be read by any origin.
fn cors_headers() -> Vec<Header> {
    [
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type"),
    ]
    .iter()
    .filter_map(|(name, value)| header(name, value))
    .collect()
}

pub fn json_response(status: u16, body: Value) -> Response<Cursor<Vec<u8>>> {
    let bytes = body.to_string().into_bytes();
    let len = bytes.len();
    let mut headers = cors_headers();
    headers.extend(header("Content-Type", "application/json"));
    Response::new(
        StatusCode(status),
        headers,
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn error_response(status: u16, error: &str, details: Option<String>) -> Response<Cursor<Vec<u8>>> {
    let body = match details {
        Some(details) => json!({ "error": error, "details": details }),
        None => json!({ "error": error }),
    };
    json_response(status, body)
}

pub fn preflight() -> Response<Cursor<Vec<u8>>> {
    Response::new(
        StatusCode(204),
        cors_headers(),
        Cursor::new(Vec::new()),
        Some(0),
        None,
    )
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    error_response(404, "Not found", None)
}

pub fn route<R: Read>(
    method: &Method,
    path: &str,
    upload: Upload<R>,
    state: &ServerState,
) -> Response<Cursor<Vec<u8>>> {
    match (method, path) {
        (Method::Options, _)       => preflight(),
        (Method::Get,  "/")        => handlers::health::handle(state),
        (Method::Post, "/predict") => handlers::predict::handle_predict(upload, state),
        (Method::Post, "/process") => handlers::predict::handle_process(upload, state),
        _ => not_found(),
    }
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// The dispatcher keeps ownership of the request so it can call
/// `request.respond(response)` at the end.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let path   = url.split('?').next().unwrap_or("").to_owned();
    let content_type = request.headers().iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    log::debug!("{} {}", method, path);

    let upload = Upload {
        content_type: &content_type,
        body_length: request.body_length(),
        body: request.as_reader(),
    };
    let response = route(&method, &path, upload, &state);

    if let Err(e) = request.respond(response) {
        log::warn!("failed to send response for {}: {}", path, e);
    }
}
