use pothole_nn::{train_loop, Dataset, LayerSpec, Network, TrainConfig, ActivationFunction};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<(), pothole_nn::NnError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut network = Network::new(&[
        LayerSpec::dense(2, 4),
        LayerSpec::Activation { function: ActivationFunction::Tanh },
        LayerSpec::dense(4, 1),
        LayerSpec::sigmoid(),
    ], &mut StdRng::seed_from_u64(42))?;

    let data = Dataset::from_pairs(vec![
        (vec![1.0, 0.0], 1.0),
        (vec![1.0, 1.0], 0.0),
        (vec![0.0, 1.0], 1.0),
        (vec![0.0, 0.0], 0.0),
    ])?;

    let config = TrainConfig::new(2000, 0.1).with_log_every(200);
    let report = train_loop(&mut network, &data, None, &config)?;
    println!("final loss = {:.6}", report.final_loss().unwrap_or(f64::NAN));

    for sample in &data {
        let features = sample.input.to_vec();
        let prediction = network.infer(&features)?;
        println!("Input: {:?} -> Output: {:.4}", features, prediction.probability);
    }
    Ok(())
}
