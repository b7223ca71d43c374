use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::layers::{ActivationLayer, DenseLayer, Layer};

/// Describes one layer in a network architecture.
///
/// - `Dense`      - affine layer mapping `input_size` values to `output_size`
/// - `Activation` - shape-preserving nonlinearity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerSpec {
    Dense { input_size: usize, output_size: usize },
    Activation { function: ActivationFunction },
}

impl LayerSpec {
    pub fn dense(input_size: usize, output_size: usize) -> LayerSpec {
        LayerSpec::Dense { input_size, output_size }
    }

    pub fn sigmoid() -> LayerSpec {
        LayerSpec::Activation { function: ActivationFunction::Sigmoid }
    }

    pub(crate) fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Layer {
        match *self {
            LayerSpec::Dense { input_size, output_size } => {
                Layer::Dense(DenseLayer::new(input_size, output_size, rng))
            }
            LayerSpec::Activation { function } => {
                Layer::Activation(ActivationLayer::new(function))
            }
        }
    }
}

/// An ordered, serializable architecture (input → output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub layers: Vec<LayerSpec>,
}

impl NetworkSpec {
    pub fn new(layers: Vec<LayerSpec>) -> NetworkSpec {
        NetworkSpec { layers }
    }

    /// `Dense(feature_size → hidden), Sigmoid, Dense(hidden → 1), Sigmoid`.
    pub fn pothole(feature_size: usize, hidden: usize) -> NetworkSpec {
        NetworkSpec::new(vec![
            LayerSpec::dense(feature_size, hidden),
            LayerSpec::sigmoid(),
            LayerSpec::dense(hidden, 1),
            LayerSpec::sigmoid(),
        ])
    }
}
