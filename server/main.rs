//! pothole-nn prediction server
//!
//! Loads a checkpoint written by `pothole-nn train` and classifies uploaded
//! road images. Served by a synchronous tiny_http server.
//!
//! Run with:
//!   MODEL_PATH=pothole_model.json PORT=7000 cargo run --bin server --release
//!
//! Routes:
//!   GET  /         - health check
//!   POST /predict  - multipart `file` → {is_pothole, confidence, prediction_time}
//!   POST /process  - multipart `file` → human-readable verdict

mod state;
mod routes;
mod handlers;
mod util;

use std::process::ExitCode;
use std::sync::Arc;
use tiny_http::Server;

use state::ServerState;

const DEFAULT_PORT: u16 = 7000;
const DEFAULT_MODEL_PATH: &str = "pothole_model.json";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = match std::env::var("PORT") {
        Ok(raw) => match raw.parse::<u16>() {
            Ok(port) => port,
            Err(e) => {
                log::error!("invalid PORT {:?}: {}", raw, e);
                return ExitCode::FAILURE;
            }
        },
        Err(_) => DEFAULT_PORT,
    };
    let model_path = std::env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_owned());

    let addr = format!("0.0.0.0:{}", port);
    let server = match Server::http(&addr) {
        Ok(server) => server,
        Err(e) => {
            log::error!("failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    let shared_state = Arc::new(ServerState::new(model_path));
    log::info!("listening on http://{}", addr);

    // One thread per request; inference itself is serialised by the model lock.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }

    ExitCode::SUCCESS
}
