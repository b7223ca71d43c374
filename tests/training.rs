use pothole_nn::{
    compute_accuracy, evaluate_loss, train_loop, train_network, Dataset, LayerSpec, Matrix,
    Network, NetworkSpec, NnError, Sgd, TrainConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn separable() -> Dataset {
    Dataset::from_pairs(vec![
        (vec![2.0, 2.0], 1.0),
        (vec![1.5, 2.5], 1.0),
        (vec![-2.0, -2.0], 0.0),
        (vec![-2.5, -1.5], 0.0),
    ]).unwrap()
}

fn dense_weights(network: &Network) -> Vec<Matrix> {
    network
        .layers()
        .iter()
        .filter_map(|layer| layer.as_dense())
        .flat_map(|dense| [dense.weights().clone(), dense.bias().clone()])
        .collect()
}

#[test]
fn single_layer_learns_separable_data() {
    for seed in [0u64, 1, 2, 3] {
        let mut network = Network::new(
            &[LayerSpec::dense(2, 1), LayerSpec::sigmoid()],
            &mut StdRng::seed_from_u64(seed),
        ).unwrap();
        let data = separable();

        let initial = evaluate_loss(&mut network, &data).unwrap();
        let report = train_loop(&mut network, &data, None, &TrainConfig::new(200, 0.1)).unwrap();
        let last = report.final_loss().unwrap();

        assert_eq!(report.history.len(), 200);
        assert!(last < initial, "seed {}: loss {} did not drop below {}", seed, last, initial);
        assert!(last < report.history[0].train_loss);
        assert_eq!(compute_accuracy(&mut network, &data).unwrap(), 100.0);
        assert_eq!(report.final_accuracy(), Some(100.0));
    }
}

#[test]
fn hidden_layer_network_reduces_loss() {
    let mut network = Network::from_spec(
        &NetworkSpec::pothole(2, 4),
        &mut StdRng::seed_from_u64(17),
    ).unwrap();
    let data = separable();

    let initial = evaluate_loss(&mut network, &data).unwrap();
    train_loop(&mut network, &data, None, &TrainConfig::new(200, 0.1)).unwrap();
    let trained = evaluate_loss(&mut network, &data).unwrap();

    assert!(trained < initial);
}

#[test]
fn one_epoch_updates_weights_per_sample() {
    let mut network = Network::new(
        &[LayerSpec::dense(2, 1), LayerSpec::sigmoid()],
        &mut StdRng::seed_from_u64(4),
    ).unwrap();
    let before = dense_weights(&network);

    let loss = train_network(&mut network, &separable(), &Sgd::new(0.1).unwrap()).unwrap();

    assert!(loss.is_finite() && loss > 0.0);
    assert_ne!(dense_weights(&network), before);
}

#[test]
fn empty_dataset_is_a_configuration_error_without_mutation() {
    let mut network = Network::from_spec(
        &NetworkSpec::pothole(2, 3),
        &mut StdRng::seed_from_u64(8),
    ).unwrap();
    let before = dense_weights(&network);
    let empty = Dataset::new(2);

    let err = train_loop(&mut network, &empty, None, &TrainConfig::new(5, 0.1)).unwrap_err();
    assert!(matches!(err, NnError::Configuration(_)));

    let err = train_network(&mut network, &empty, &Sgd::new(0.1).unwrap()).unwrap_err();
    assert!(matches!(err, NnError::Configuration(_)));

    assert_eq!(dense_weights(&network), before);
}

#[test]
fn feature_length_mismatch_is_caught_before_training() {
    let mut network = Network::from_spec(
        &NetworkSpec::pothole(3, 2),
        &mut StdRng::seed_from_u64(8),
    ).unwrap();
    let before = dense_weights(&network);

    let err = train_loop(&mut network, &separable(), None, &TrainConfig::new(5, 0.1)).unwrap_err();
    assert!(matches!(err, NnError::Configuration(_)));
    assert_eq!(dense_weights(&network), before);
}

#[test]
fn same_seed_same_training_run() {
    let run = || {
        let mut network = Network::from_spec(
            &NetworkSpec::pothole(2, 3),
            &mut StdRng::seed_from_u64(99),
        ).unwrap();
        train_loop(&mut network, &separable(), None, &TrainConfig::new(10, 0.1)).unwrap();
        dense_weights(&network)
    };
    assert_eq!(run(), run());
}
