use pothole_nn::{
    train_loop, Checkpoint, Dataset, InputType, Matrix, ModelMetadata, Network, NetworkSpec,
    NnError, TrainConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn trained_network() -> Network {
    let mut network = Network::from_spec(
        &NetworkSpec::pothole(3, 5),
        &mut StdRng::seed_from_u64(31),
    ).unwrap();
    let data = Dataset::from_pairs(vec![
        (vec![0.9, 0.8, 0.1], 1.0),
        (vec![0.1, 0.2, 0.7], 0.0),
        (vec![0.7, 0.9, 0.3], 1.0),
    ]).unwrap();
    train_loop(&mut network, &data, None, &TrainConfig::new(20, 0.1)).unwrap();
    network
}

#[test]
fn save_then_load_reproduces_predictions_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let path = path.to_str().unwrap();

    let mut network = trained_network();
    let input = Matrix::column(vec![0.123456789, 0.987654321, 0.5]).unwrap();
    let before = network.predict(&input).unwrap();

    network.save_json(path).unwrap();
    let mut loaded = Network::load_json(path).unwrap();

    assert_eq!(loaded.predict(&input).unwrap(), before);
    for (a, b) in network.layers().iter().zip(loaded.layers()) {
        match (a.as_dense(), b.as_dense()) {
            (Some(a), Some(b)) => {
                assert_eq!(a.weights(), b.weights());
                assert_eq!(a.bias(), b.bias());
            }
            (None, None) => {}
            _ => panic!("layer kinds differ after reload"),
        }
    }
}

#[test]
fn metadata_survives_the_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let path = path.to_str().unwrap();

    let metadata = ModelMetadata {
        description: Some("three-feature toy".into()),
        input_type: Some(InputType::Numeric),
        output_labels: Some(vec!["normal".into(), "potholes".into()]),
    };
    Checkpoint::new(trained_network())
        .with_metadata(metadata.clone())
        .save_json(path)
        .unwrap();

    let loaded = Checkpoint::load_json(path).unwrap();
    assert_eq!(loaded.metadata, metadata);
    assert_eq!(loaded.metadata.label_for(true), Some("potholes"));
    assert_eq!(loaded.network.input_size(), 3);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert!(matches!(
        Network::load_json(path.to_str().unwrap()),
        Err(NnError::Io(_))
    ));
}

#[test]
fn corrupt_file_is_a_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        Checkpoint::load_json(path.to_str().unwrap()),
        Err(NnError::Json(_))
    ));
}
