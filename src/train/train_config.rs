use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use crate::error::{NnError, Result};
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`        - total number of full passes over the training data
/// - `learning_rate` - SGD step size, applied after every sample
/// - `log_every`     - log an epoch summary every N epochs (0 disables)
/// - `progress_tx`   - optional channel sender; one `EpochStats` is sent per
///                     completed epoch.  If the receiver is dropped the loop
///                     terminates early (clean shutdown).
/// - `stop_flag`     - optional atomic flag; when set to `true` from another
///                     thread the loop terminates after the current epoch.
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub log_every: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` that logs every epoch, with no
    /// progress channel and no stop flag.
    pub fn new(epochs: usize, learning_rate: f64) -> Self {
        TrainConfig {
            epochs,
            learning_rate,
            log_every: 1,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn with_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NnError::config("epochs must be at least 1"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NnError::config(format!(
                "learning rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
