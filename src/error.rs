use thiserror::Error;

/// Every failure the engine can surface to its caller.
///
/// None of these are retried internally: a failing sample aborts the epoch,
/// a failing epoch aborts the run.
#[derive(Error, Debug)]
pub enum NnError {
    /// Two operands (or a layer and its input) disagree on dimensions.
    #[error("shape mismatch in {op}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        op: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A layer was asked to go backward without a matching forward.
    #[error("invalid layer state: {0}")]
    State(String),

    /// NaN reached the loss, where clamping can no longer help.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// Empty dataset, bad hyperparameters, or an inconsistent layer chain.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, NnError>;

impl NnError {
    pub(crate) fn config(msg: impl Into<String>) -> NnError {
        NnError::Configuration(msg.into())
    }
}
