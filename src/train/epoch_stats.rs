use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `EpochStats` value at the end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean training loss accumulated while the weights were moving.
    pub train_loss: f64,
    /// Training accuracy in percent, measured after the epoch.
    pub train_accuracy: f64,
    /// Mean validation loss, if a validation set was provided.
    pub val_loss: Option<f64>,
    /// Validation accuracy in percent, if a validation set was provided.
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Outcome of a full `train_loop` run.
#[derive(Debug, Clone, Default)]
pub struct TrainReport {
    pub history: Vec<EpochStats>,
    /// True when the stop flag or a dropped progress receiver ended the run
    /// before all requested epochs completed.
    pub stopped_early: bool,
}

impl TrainReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.history.last().map(|s| s.train_loss)
    }

    pub fn final_accuracy(&self) -> Option<f64> {
        self.history.last().map(|s| s.train_accuracy)
    }
}
