use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::layers::Layer;
use crate::math::matrix::Matrix;
use crate::network::checkpoint::Checkpoint;
use crate::network::spec::{LayerSpec, NetworkSpec};

/// Decisions are `probability > DECISION_THRESHOLD`.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Result of a single inference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub decision: bool,
}

impl Prediction {
    pub fn from_probability(probability: f64) -> Prediction {
        Prediction { probability, decision: probability > DECISION_THRESHOLD }
    }
}

/// An ordered chain of layers that owns all learnable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Layer>", into = "Vec<Layer>")]
pub struct Network {
    layers: Vec<Layer>,
    input_size: usize,
    output_size: usize,
}

impl Network {
    /// Builds a network from layer descriptions, initialising every Dense
    /// layer from `rng`.
    pub fn new<R: Rng + ?Sized>(specs: &[LayerSpec], rng: &mut R) -> Result<Network> {
        for spec in specs {
            if let LayerSpec::Dense { input_size, output_size } = *spec {
                if input_size == 0 || output_size == 0 {
                    return Err(NnError::config(format!(
                        "dense layer sizes must be positive, got {}→{}",
                        input_size, output_size
                    )));
                }
            }
        }
        let layers = specs.iter().map(|spec| spec.build(rng)).collect();
        Network::from_layers(layers)
    }

    pub fn from_spec<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        Network::new(&spec.layers, rng)
    }

    /// Wraps already-built layers after checking that consecutive Dense
    /// sizes line up (activations preserve shape).
    pub fn from_layers(layers: Vec<Layer>) -> Result<Network> {
        let mut input_size = None;
        let mut width: Option<usize> = None;

        for (i, layer) in layers.iter().enumerate() {
            let Some(dense) = layer.as_dense() else { continue };

            if dense.input_size() == 0 || dense.output_size() == 0 {
                return Err(NnError::config(format!("layer {} has an empty weight matrix", i)));
            }
            if dense.bias().shape() != (dense.output_size(), 1) {
                return Err(NnError::config(format!(
                    "layer {} bias has shape {:?}, expected ({}, 1)",
                    i, dense.bias().shape(), dense.output_size()
                )));
            }
            match width {
                Some(w) if w != dense.input_size() => {
                    return Err(NnError::config(format!(
                        "layer {} expects {} inputs but the previous dense layer produces {}",
                        i, dense.input_size(), w
                    )));
                }
                None => input_size = Some(dense.input_size()),
                _ => {}
            }
            width = Some(dense.output_size());
        }

        match (input_size, width) {
            (Some(input_size), Some(output_size)) => Ok(Network { layers, input_size, output_size }),
            _ => Err(NnError::config("network needs at least one dense layer")),
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable access to individual layers. The layer sequence itself is
    /// fixed at construction.
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Fails with a configuration error unless `feature_size` matches the
    /// first dense layer.
    pub fn ensure_input_size(&self, feature_size: usize) -> Result<()> {
        if feature_size != self.input_size {
            return Err(NnError::config(format!(
                "feature vectors have {} values but the network expects {}",
                feature_size, self.input_size
            )));
        }
        Ok(())
    }

    /// Forward pass; every layer caches its input for backprop.
    pub fn predict(&mut self, input: &Matrix) -> Result<Matrix> {
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current)?;
        }
        Ok(current)
    }

    /// Walks the layers in reverse, updating parameters as it goes.
    /// Returns the gradient with respect to the network input.
    pub fn backward(&mut self, output_gradient: &Matrix, learning_rate: f64) -> Result<Matrix> {
        let mut grad = output_gradient.clone();
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad, learning_rate)?;
        }
        Ok(grad)
    }

    /// Single-output inference on one flattened feature vector.
    pub fn infer(&mut self, features: &[f64]) -> Result<Prediction> {
        self.ensure_input_size(features.len())?;
        if self.output_size != 1 {
            return Err(NnError::config(format!(
                "inference needs a single output, network has {}",
                self.output_size
            )));
        }
        let output = self.predict(&Matrix::column(features.to_vec())?)?;
        let probability = output.get(0, 0);
        if probability.is_nan() {
            return Err(NnError::NumericalInstability("network produced NaN".to_owned()));
        }
        Ok(Prediction::from_probability(probability.clamp(0.0, 1.0)))
    }

    pub fn is_finite(&self) -> bool {
        self.layers
            .iter()
            .filter_map(Layer::as_dense)
            .all(|dense| dense.is_finite())
    }

    /// Serializes the network (without metadata) to a pretty-printed JSON
    /// checkpoint.
    pub fn save_json(&self, path: &str) -> Result<()> {
        Checkpoint::new(self.clone()).save_json(path)
    }

    /// Loads the network from a checkpoint written by `save_json` or
    /// `Checkpoint::save_json`.
    pub fn load_json(path: &str) -> Result<Network> {
        Ok(Checkpoint::load_json(path)?.network)
    }
}

impl TryFrom<Vec<Layer>> for Network {
    type Error = NnError;

    fn try_from(layers: Vec<Layer>) -> Result<Network> {
        Network::from_layers(layers)
    }
}

impl From<Network> for Vec<Layer> {
    fn from(network: Network) -> Self {
        network.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::layers::{ActivationLayer, DenseLayer};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn two_input_example_network() {
        let dense = DenseLayer::from_parameters(
            Matrix::from_data(vec![vec![1.0, 1.0]]).unwrap(),
            Matrix::column(vec![0.0]).unwrap(),
        ).unwrap();
        let mut net = Network::from_layers(vec![
            dense.into(),
            ActivationLayer::sigmoid().into(),
        ]).unwrap();

        let input = Matrix::column(vec![1.0, 1.0]).unwrap();
        let pre = net.layers_mut()[0].forward(&input).unwrap();
        assert_eq!(pre.get(0, 0), 2.0);

        let out = net.predict(&input).unwrap();
        assert!((out.get(0, 0) - 0.880797).abs() < 1e-6);

        let p = net.infer(&[1.0, 1.0]).unwrap();
        assert!(p.decision);
    }

    #[test]
    fn rejects_mismatched_chain() {
        let specs = [
            LayerSpec::dense(4, 3),
            LayerSpec::sigmoid(),
            LayerSpec::dense(2, 1),
        ];
        assert!(matches!(Network::new(&specs, &mut rng()), Err(NnError::Configuration(_))));
    }

    #[test]
    fn rejects_empty_and_zero_sized() {
        assert!(Network::new(&[], &mut rng()).is_err());
        assert!(Network::new(&[LayerSpec::sigmoid()], &mut rng()).is_err());
        assert!(Network::new(&[LayerSpec::dense(0, 1)], &mut rng()).is_err());
    }

    #[test]
    fn reports_input_and_output_sizes() {
        let net = Network::from_spec(&NetworkSpec::pothole(16, 8), &mut rng()).unwrap();
        assert_eq!(net.input_size(), 16);
        assert_eq!(net.output_size(), 1);
        assert_eq!(net.layers().len(), 4);
        assert!(net.ensure_input_size(16).is_ok());
        assert!(matches!(net.ensure_input_size(15), Err(NnError::Configuration(_))));
    }

    #[test]
    fn infer_rejects_wrong_length_and_multi_output() {
        let mut net = Network::new(&[LayerSpec::dense(3, 1), LayerSpec::sigmoid()], &mut rng()).unwrap();
        assert!(net.infer(&[1.0, 2.0]).is_err());

        let mut wide = Network::new(&[
            LayerSpec::dense(2, 2),
            LayerSpec::Activation { function: ActivationFunction::Tanh },
        ], &mut rng()).unwrap();
        assert!(wide.infer(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn predict_propagates_shape_errors() {
        let mut net = Network::new(&[LayerSpec::dense(3, 1)], &mut rng()).unwrap();
        assert!(matches!(
            net.predict(&Matrix::zeros(2, 1)),
            Err(NnError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn backward_before_predict_is_a_state_error() {
        let mut net = Network::new(&[LayerSpec::dense(2, 1), LayerSpec::sigmoid()], &mut rng()).unwrap();
        assert!(matches!(
            net.backward(&Matrix::zeros(1, 1), 0.1),
            Err(NnError::State(_))
        ));
    }

    #[test]
    fn decision_threshold_is_strict() {
        assert!(!Prediction::from_probability(0.5).decision);
        assert!(Prediction::from_probability(0.5000001).decision);
    }
}
