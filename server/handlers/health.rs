use std::io::Cursor;
use serde_json::json;
use tiny_http::Response;

use crate::state::ServerState;

/// `GET /`
pub fn handle(state: &ServerState) -> Response<Cursor<Vec<u8>>> {
    crate::routes::json_response(200, json!({
        "status": "online",
        "service": "Pothole Detection",
        "model_loaded": state.model.is_some(),
        "model_path": state.model_path,
    }))
}
