use crate::{
    data::dataset::Dataset,
    error::{NnError, Result},
    loss::bce::BceLoss,
    network::network::Network,
    optim::sgd::Sgd,
};

/// One pass over `dataset` in its given order with a batch size of one.
///
/// Each sample is pushed forward, scored with binary cross-entropy, and
/// back-propagated immediately, so later samples see the updated weights.
/// Returns the mean loss over the epoch.
///
/// The dataset is checked before any weight moves: an empty dataset or a
/// feature length that does not match the network is a configuration error.
/// An error on any individual sample aborts the epoch.
pub fn train_network(
    network: &mut Network,
    dataset: &Dataset,
    optimizer: &Sgd,
) -> Result<f64> {
    check_dataset(network, dataset)?;

    let mut total_loss = 0.0;

    for sample in dataset {
        // Forward pass; every layer caches its input.
        let output = network.predict(&sample.input)?;
        let target = sample.target();

        total_loss += BceLoss::loss(&output, &target)?;

        // Initial delta: ∂L/∂output
        let grad = BceLoss::derivative(&output, &target)?;

        // Backward pass with in-place updates.
        optimizer.step(network, &grad)?;
    }

    Ok(total_loss / dataset.len() as f64)
}

pub(crate) fn check_dataset(network: &Network, dataset: &Dataset) -> Result<()> {
    if dataset.is_empty() {
        return Err(NnError::config("cannot train on an empty dataset"));
    }
    network.ensure_input_size(dataset.feature_size())?;
    if network.output_size() != 1 {
        return Err(NnError::config(format!(
            "binary training needs a single output, network has {}",
            network.output_size()
        )));
    }
    Ok(())
}
