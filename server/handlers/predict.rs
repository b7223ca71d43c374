use std::io::{Cursor, Read};
use std::time::{Duration, Instant};

use serde_json::json;
use tiny_http::Response;

use pothole_nn::{NnError, Prediction};

use crate::routes::{error_response, json_response};
use crate::state::ServerState;
use crate::util::multipart::{extract_boundary, extract_file};

/// Uploads larger than this are refused before the body is read.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

enum PredictError {
    NoModel,
    NoFile,
    NoSelectedFile,
    TooLarge(usize),
    Processing(String),
}

impl PredictError {
    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        match self {
            PredictError::NoModel => error_response(503, "Model not loaded", None),
            PredictError::NoFile => error_response(400, "No file provided", None),
            PredictError::NoSelectedFile => error_response(400, "No selected file", None),
            PredictError::TooLarge(len) => error_response(
                413,
                "File too large",
                Some(format!("{} bytes exceeds the {} byte limit", len, MAX_UPLOAD_BYTES)),
            ),
            PredictError::Processing(details) => {
                error_response(500, "Failed to process image", Some(details))
            }
        }
    }
}

impl From<NnError> for PredictError {
    fn from(e: NnError) -> Self {
        PredictError::Processing(e.to_string())
    }
}

/// The parts of a `POST` the prediction handlers read.
pub struct Upload<'a, R> {
    pub content_type: &'a str,
    pub body_length: Option<usize>,
    pub body: R,
}

struct Outcome {
    prediction: Prediction,
    label: Option<String>,
    elapsed: Duration,
}

/// `POST /predict` - multipart upload in field `file`.
pub fn handle_predict<R: Read>(upload: Upload<R>, state: &ServerState) -> Response<Cursor<Vec<u8>>> {
    match classify(upload, state) {
        Ok(outcome) => json_response(200, json!({
            "is_pothole": outcome.prediction.decision,
            "confidence": outcome.prediction.probability,
            "label": outcome.label,
            "prediction_time": format!("{:.2}s", outcome.elapsed.as_secs_f64()),
        })),
        Err(e) => e.into_response(),
    }
}

/// `POST /process` - same input, human-readable verdict.
pub fn handle_process<R: Read>(upload: Upload<R>, state: &ServerState) -> Response<Cursor<Vec<u8>>> {
    match classify(upload, state) {
        Ok(outcome) => {
            let detected = outcome.prediction.decision;
            json_response(200, json!({
                "pothole_detected": if detected { "Yes" } else { "No" },
                "confidence_level": format!("{:.2}%", outcome.prediction.probability * 100.0),
                "prediction_time": format!("{:.2} seconds", outcome.elapsed.as_secs_f64()),
                "recommendation": if detected {
                    "Immediate Repair Needed"
                } else {
                    "No Immediate Action Needed"
                },
            }))
        }
        Err(e) => e.into_response(),
    }
}

fn classify<R: Read>(upload: Upload<R>, state: &ServerState) -> Result<Outcome, PredictError> {
    let model = state.model.as_ref().ok_or(PredictError::NoModel)?;

    if !upload.content_type.to_ascii_lowercase().starts_with("multipart/form-data") {
        log::error!("predict request without multipart body");
        return Err(PredictError::NoFile);
    }
    let boundary = extract_boundary(upload.content_type).ok_or(PredictError::NoFile)?;

    if let Some(len) = upload.body_length {
        if len > MAX_UPLOAD_BYTES {
            return Err(PredictError::TooLarge(len));
        }
    }
    let mut body = Vec::new();
    upload
        .body
        .take(MAX_UPLOAD_BYTES as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| PredictError::Processing(e.to_string()))?;
    if body.len() > MAX_UPLOAD_BYTES {
        return Err(PredictError::TooLarge(body.len()));
    }

    let file = extract_file(&body, &boundary, "file").ok_or_else(|| {
        log::error!("no file provided");
        PredictError::NoFile
    })?;
    if file.filename.is_empty() {
        log::error!("no selected file");
        return Err(PredictError::NoSelectedFile);
    }

    log::info!("processing {} ({} bytes)", file.filename, file.bytes.len());
    let features = model.pipeline.preprocess_bytes(&file.bytes)?.to_vec();

    let start = Instant::now();
    let prediction = {
        let mut network = model
            .network
            .lock()
            .map_err(|_| PredictError::Processing("model lock poisoned".to_owned()))?;
        network.infer(&features)?
    };
    let elapsed = start.elapsed();

    log::info!(
        "prediction complete: {}, {:.4}, {:.2}s",
        prediction.decision, prediction.probability, elapsed.as_secs_f64()
    );

    Ok(Outcome {
        prediction,
        label: model.metadata.label_for(prediction.decision).map(str::to_owned),
        elapsed,
    })
}
