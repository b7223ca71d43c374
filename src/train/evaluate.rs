use crate::data::dataset::Dataset;
use crate::error::{NnError, Result};
use crate::loss::bce::BceLoss;
use crate::network::network::{Network, DECISION_THRESHOLD};
use crate::train::trainer::check_dataset;

/// Percentage of samples whose thresholded prediction (`> 0.5`) equals the
/// label. No weights change. A NaN output is reported, not counted.
pub fn compute_accuracy(network: &mut Network, dataset: &Dataset) -> Result<f64> {
    check_dataset(network, dataset)?;
    let mut correct = 0usize;
    for sample in dataset {
        let output = network.predict(&sample.input)?;
        if output.has_nan() {
            return Err(NnError::NumericalInstability(
                "network produced NaN while scoring accuracy".to_owned(),
            ));
        }
        let predicted = if output.get(0, 0) > DECISION_THRESHOLD { 1.0 } else { 0.0 };
        if predicted == sample.label {
            correct += 1;
        }
    }
    Ok(correct as f64 / dataset.len() as f64 * 100.0)
}

/// Mean binary cross-entropy over `dataset` without updating weights.
pub fn evaluate_loss(network: &mut Network, dataset: &Dataset) -> Result<f64> {
    check_dataset(network, dataset)?;
    let mut total = 0.0;
    for sample in dataset {
        let output = network.predict(&sample.input)?;
        total += BceLoss::loss(&output, &sample.target())?;
    }
    Ok(total / dataset.len() as f64)
}
