pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod data;
pub mod features;
pub mod train;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::{ActivationLayer, DenseLayer, Layer};
pub use network::{Checkpoint, InputType, LayerSpec, ModelMetadata, Network, NetworkSpec, Prediction};
pub use loss::bce::BceLoss;
pub use optim::sgd::Sgd;
pub use data::{load_image_folder, Dataset, Sample};
pub use features::pipeline::FeaturePipeline;
pub use train::{compute_accuracy, evaluate_loss, train_loop, train_network, TrainConfig, TrainReport};
