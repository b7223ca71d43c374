// Command-line front end for the library: train a model from an image folder
// or classify images with a saved checkpoint.
//   cargo run --release -- train --data Train_data --output pothole_model.json
//   cargo run --release -- predict --model pothole_model.json road.jpg
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use pothole_nn::{
    compute_accuracy, load_image_folder, train_loop, Checkpoint, FeaturePipeline,
    ModelMetadata, Network, NetworkSpec, NnError, TrainConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pothole classifier built on a from-scratch neural network")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a new model from a folder with two class sub-directories
    Train(TrainArgs),
    /// Classify images with a saved model
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Dataset root (e.g. Train_data/{normal,potholes})
    #[arg(short, long)]
    data: PathBuf,

    /// Where to write the trained checkpoint
    #[arg(short, long, default_value = "pothole_model.json")]
    output: String,

    /// Feature image width
    #[arg(long, default_value_t = 28)]
    width: u32,

    /// Feature image height
    #[arg(long, default_value_t = 28)]
    height: u32,

    /// Hidden layer size
    #[arg(long, default_value_t = 100)]
    hidden: usize,

    #[arg(long, default_value_t = 10)]
    epochs: usize,

    #[arg(long, default_value_t = 0.01)]
    learning_rate: f64,

    /// Fraction of samples used for training; the rest validates
    #[arg(long, default_value_t = 0.8)]
    train_ratio: f64,

    /// Seed for weight initialisation and the train/validation split
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Checkpoint written by `train`
    #[arg(short, long)]
    model: String,

    /// Images to classify
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Train(args) => run_train(args),
        Command::Predict(args) => run_predict(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_train(args: TrainArgs) -> Result<(), NnError> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let pipeline = FeaturePipeline::new(args.width, args.height)?;
    let dataset = load_image_folder(&args.data, &pipeline)?;
    let (train, validation) = dataset.split(args.train_ratio, &mut rng)?;
    log::info!(
        "{} samples: {} train / {} validation",
        dataset.len(), train.len(), validation.len()
    );

    let spec = NetworkSpec::pothole(pipeline.feature_size(), args.hidden);
    let mut network = Network::from_spec(&spec, &mut rng)?;
    pipeline.check_network(&network)?;

    let config = TrainConfig::new(args.epochs, args.learning_rate);
    let report = train_loop(&mut network, &train, Some(&validation), &config)?;

    let accuracy = compute_accuracy(&mut network, &train)?;
    println!("Final training accuracy: {:.2}%", accuracy);
    if let Some(loss) = report.final_loss() {
        println!("Final training loss:     {:.4}", loss);
    }

    let metadata = ModelMetadata {
        description: Some(format!(
            "{} epochs at lr={} on {}",
            report.history.len(), args.learning_rate, args.data.display()
        )),
        input_type: Some(pipeline.input_type()),
        output_labels: dataset.class_names().map(|names| names.to_vec()),
    };
    Checkpoint::new(network).with_metadata(metadata).save_json(&args.output)?;
    println!("Model saved to {}", args.output);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<(), NnError> {
    let Checkpoint { metadata, mut network, .. } = Checkpoint::load_json(&args.model)?;
    let pipeline = metadata
        .input_type
        .as_ref()
        .and_then(FeaturePipeline::from_input_type)
        .ok_or_else(|| NnError::Configuration(format!(
            "{} does not record an image input type",
            args.model
        )))?;
    pipeline.check_network(&network)?;

    for path in &args.images {
        let features = pipeline.preprocess_path(path)?.to_vec();
        let prediction = network.infer(&features)?;
        let verdict = metadata
            .label_for(prediction.decision)
            .map(str::to_owned)
            .unwrap_or_else(|| if prediction.decision { "positive".into() } else { "negative".into() });
        println!(
            "{}: {} (p={:.4})",
            path.display(), verdict, prediction.probability
        );
    }
    Ok(())
}
