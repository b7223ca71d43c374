pub mod activation;
pub mod dense;

use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::math::matrix::Matrix;

pub use activation::ActivationLayer;
pub use dense::DenseLayer;

/// The two layer kinds a `Network` is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    Dense(DenseLayer),
    Activation(ActivationLayer),
}

impl Layer {
    /// Forward pass. Caches `input` on the layer for the next `backward`.
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        match self {
            Layer::Dense(dense) => dense.forward(input),
            Layer::Activation(act) => act.forward(input),
        }
    }

    /// Backward pass. Updates learnable parameters (if any) and returns the
    /// gradient for the preceding layer.
    pub fn backward(&mut self, output_gradient: &Matrix, learning_rate: f64) -> Result<Matrix> {
        match self {
            Layer::Dense(dense) => dense.backward(output_gradient, learning_rate),
            Layer::Activation(act) => act.backward(output_gradient, learning_rate),
        }
    }

    pub fn as_dense(&self) -> Option<&DenseLayer> {
        match self {
            Layer::Dense(dense) => Some(dense),
            Layer::Activation(_) => None,
        }
    }

    pub fn as_dense_mut(&mut self) -> Option<&mut DenseLayer> {
        match self {
            Layer::Dense(dense) => Some(dense),
            Layer::Activation(_) => None,
        }
    }
}

impl From<DenseLayer> for Layer {
    fn from(layer: DenseLayer) -> Self {
        Layer::Dense(layer)
    }
}

impl From<ActivationLayer> for Layer {
    fn from(layer: ActivationLayer) -> Self {
        Layer::Activation(layer)
    }
}
