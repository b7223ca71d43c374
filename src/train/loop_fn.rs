use std::sync::atomic::Ordering;
use std::time::Instant;

use crate::data::dataset::Dataset;
use crate::error::Result;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::{EpochStats, TrainReport};
use crate::train::evaluate::{compute_accuracy, evaluate_loss};
use crate::train::train_config::TrainConfig;
use crate::train::trainer::{check_dataset, train_network};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs of online SGD and returns the
/// per-epoch history.
///
/// # Arguments
/// - `network`    - mutable reference to the network; modified in place
/// - `train`      - training samples, visited in their stored order
/// - `validation` - optional held-out samples, evaluated after each epoch
///                  (skipped when empty)
/// - `config`     - hyperparameters, optional progress channel, optional stop flag
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Errors
/// Configuration errors (bad hyperparameters, empty or mismatched data) are
/// reported before any weight changes. Any error during an epoch aborts the
/// run and is returned as is.
pub fn train_loop(
    network: &mut Network,
    train: &Dataset,
    validation: Option<&Dataset>,
    config: &TrainConfig,
) -> Result<TrainReport> {
    config.validate()?;
    check_dataset(network, train)?;
    let validation = validation.filter(|v| !v.is_empty());
    if let Some(v) = validation {
        check_dataset(network, v)?;
    }

    let optimizer = Sgd::new(config.learning_rate)?;
    let mut report = TrainReport::default();

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            log::warn!("training stopped before epoch {}", epoch);
            report.stopped_early = true;
            break;
        }

        let t_start = Instant::now();

        // ── One full pass over the training data ───────────────────────────
        let train_loss = train_network(network, train, &optimizer)?;
        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        let train_accuracy = compute_accuracy(network, train)?;

        // ── Validation ────────────────────────────────────────────────────
        let (val_loss, val_accuracy) = match validation {
            Some(v) => (Some(evaluate_loss(network, v)?), Some(compute_accuracy(network, v)?)),
            None => (None, None),
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            train_accuracy,
            val_loss,
            val_accuracy,
            elapsed_ms,
        };
        log_epoch(&stats, config.log_every);
        report.history.push(stats.clone());

        // ── Emit progress ─────────────────────────────────────────────────
        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                log::warn!("progress receiver dropped after epoch {}", epoch);
                report.stopped_early = epoch < config.epochs;
                break;
            }
        }
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}

fn log_epoch(stats: &EpochStats, log_every: usize) {
    let due = log_every > 0 && (stats.epoch % log_every == 0 || stats.epoch == stats.total_epochs);
    if !due {
        return;
    }
    match (stats.val_loss, stats.val_accuracy) {
        (Some(val_loss), Some(val_accuracy)) => log::info!(
            "epoch {}/{}: loss={:.4} acc={:.2}% val_loss={:.4} val_acc={:.2}% ({} ms)",
            stats.epoch, stats.total_epochs, stats.train_loss, stats.train_accuracy,
            val_loss, val_accuracy, stats.elapsed_ms
        ),
        _ => log::info!(
            "epoch {}/{}: loss={:.4} acc={:.2}% ({} ms)",
            stats.epoch, stats.total_epochs, stats.train_loss, stats.train_accuracy,
            stats.elapsed_ms
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NnError;
    use crate::network::spec::NetworkSpec;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::AtomicBool;
    use std::sync::{mpsc, Arc};

    fn setup() -> (Network, Dataset) {
        let net = Network::from_spec(&NetworkSpec::pothole(2, 3), &mut StdRng::seed_from_u64(2)).unwrap();
        let data = Dataset::from_pairs(vec![
            (vec![0.0, 0.0], 0.0),
            (vec![1.0, 1.0], 1.0),
        ]).unwrap();
        (net, data)
    }

    #[test]
    fn runs_every_epoch_and_streams_progress() {
        let (mut net, data) = setup();
        let (tx, rx) = mpsc::channel();
        let config = TrainConfig::new(5, 0.1).with_progress(tx).with_log_every(0);

        let report = train_loop(&mut net, &data, Some(&data), &config).unwrap();
        drop(config);

        assert_eq!(report.history.len(), 5);
        assert!(!report.stopped_early);
        let received: Vec<EpochStats> = rx.iter().collect();
        assert_eq!(received, report.history);
        assert!(received.iter().all(|s| s.val_loss.is_some()));
    }

    #[test]
    fn stop_flag_halts_before_first_epoch() {
        let (mut net, data) = setup();
        let flag = Arc::new(AtomicBool::new(true));
        let config = TrainConfig::new(10, 0.1).with_stop_flag(flag);
        let report = train_loop(&mut net, &data, None, &config).unwrap();
        assert!(report.history.is_empty());
        assert!(report.stopped_early);
    }

    #[test]
    fn dropped_receiver_stops_training() {
        let (mut net, data) = setup();
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let config = TrainConfig::new(10, 0.1).with_progress(tx);
        let report = train_loop(&mut net, &data, None, &config).unwrap();
        assert_eq!(report.history.len(), 1);
        assert!(report.stopped_early);
    }

    #[test]
    fn rejects_bad_hyperparameters() {
        let (mut net, data) = setup();
        assert!(matches!(
            train_loop(&mut net, &data, None, &TrainConfig::new(0, 0.1)),
            Err(NnError::Configuration(_))
        ));
        assert!(matches!(
            train_loop(&mut net, &data, None, &TrainConfig::new(3, -1.0)),
            Err(NnError::Configuration(_))
        ));
    }

    #[test]
    fn empty_validation_set_is_skipped() {
        let (mut net, data) = setup();
        let empty = Dataset::new(2);
        let report = train_loop(&mut net, &data, Some(&empty), &TrainConfig::new(2, 0.1)).unwrap();
        assert!(report.history.iter().all(|s| s.val_loss.is_none()));
    }
}
