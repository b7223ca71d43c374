use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Fully connected affine layer: `output = weights · input + bias`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Shape `(output_size, input_size)`.
    weights: Matrix,
    /// Shape `(output_size, 1)`.
    bias: Matrix,
    #[serde(skip)]
    last_input: Option<Matrix>,
}

impl DenseLayer {
    /// Weights and bias drawn from N(0, 1).
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> DenseLayer {
        DenseLayer {
            weights: Matrix::random_normal(output_size, input_size, rng),
            bias: Matrix::random_normal(output_size, 1, rng),
            last_input: None,
        }
    }

    /// Xavier-scaled weights, zero bias.
    pub fn xavier<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> DenseLayer {
        DenseLayer {
            weights: Matrix::xavier(output_size, input_size, rng),
            bias: Matrix::zeros(output_size, 1),
            last_input: None,
        }
    }

    pub fn from_parameters(weights: Matrix, bias: Matrix) -> Result<DenseLayer> {
        if bias.shape() != (weights.rows(), 1) {
            return Err(NnError::ShapeMismatch {
                op: "dense bias",
                expected: (weights.rows(), 1),
                found: bias.shape(),
            });
        }
        Ok(DenseLayer { weights, bias, last_input: None })
    }

    pub fn input_size(&self) -> usize {
        self.weights.cols()
    }

    pub fn output_size(&self) -> usize {
        self.weights.rows()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    pub fn weights_mut(&mut self) -> &mut Matrix {
        &mut self.weights
    }

    pub fn bias_mut(&mut self) -> &mut Matrix {
        &mut self.bias
    }

    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        if input.shape() != (self.input_size(), 1) {
            return Err(NnError::ShapeMismatch {
                op: "dense forward",
                expected: (self.input_size(), 1),
                found: input.shape(),
            });
        }
        let output = self.weights.dot(input)?.add(&self.bias)?;
        self.last_input = Some(input.clone());
        Ok(output)
    }

    /// Back-propagates `output_gradient` (∂L/∂output) and applies one SGD
    /// step to the weights and bias in place.
    ///
    /// Returns ∂L/∂input, computed with the weights as they were before
    /// the update. The bias gradient is the output gradient itself; this
    /// only holds for a batch size of one.
    pub fn backward(&mut self, output_gradient: &Matrix, learning_rate: f64) -> Result<Matrix> {
        let input = self.last_input.as_ref().ok_or_else(|| {
            NnError::State("dense backward called before forward".to_owned())
        })?;
        if output_gradient.shape() != (self.output_size(), 1) {
            return Err(NnError::ShapeMismatch {
                op: "dense backward",
                expected: (self.output_size(), 1),
                found: output_gradient.shape(),
            });
        }

        let weight_gradient = output_gradient.dot(&input.transpose())?;
        let input_gradient = self.weights.transpose().dot(output_gradient)?;

        self.weights.sub_assign_scaled(&weight_gradient, learning_rate)?;
        self.bias.sub_assign_scaled(output_gradient, learning_rate)?;

        Ok(input_gradient)
    }

    pub fn is_finite(&self) -> bool {
        self.weights.is_finite() && self.bias.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layer(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> DenseLayer {
        DenseLayer::from_parameters(
            Matrix::from_data(weights).unwrap(),
            Matrix::column(bias).unwrap(),
        ).unwrap()
    }

    #[test]
    fn forward_is_affine() {
        let mut d = layer(vec![vec![1.0, 1.0]], vec![0.0]);
        let out = d.forward(&Matrix::column(vec![1.0, 1.0]).unwrap()).unwrap();
        assert_eq!(out.shape(), (1, 1));
        assert_eq!(out.get(0, 0), 2.0);
    }

    #[test]
    fn forward_output_has_output_size_rows_and_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut d = DenseLayer::new(5, 3, &mut rng);
        let x = Matrix::random_normal(5, 1, &mut rng);
        let a = d.forward(&x).unwrap();
        let b = d.forward(&x).unwrap();
        assert_eq!(a.shape(), (3, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn forward_rejects_wrong_input_size() {
        let mut d = DenseLayer::new(3, 2, &mut StdRng::seed_from_u64(0));
        let err = d.forward(&Matrix::zeros(4, 1)).unwrap_err();
        assert!(matches!(err, NnError::ShapeMismatch { .. }));
    }

    #[test]
    fn backward_before_forward_is_a_state_error() {
        let mut d = DenseLayer::new(2, 1, &mut StdRng::seed_from_u64(0));
        let err = d.backward(&Matrix::zeros(1, 1), 0.1).unwrap_err();
        assert!(matches!(err, NnError::State(_)));
    }

    #[test]
    fn backward_updates_parameters_and_returns_input_gradient() {
        let mut d = layer(vec![vec![1.0, 2.0]], vec![0.5]);
        d.forward(&Matrix::column(vec![3.0, 4.0]).unwrap()).unwrap();

        let grad = Matrix::column(vec![1.0]).unwrap();
        let input_grad = d.backward(&grad, 0.1).unwrap();

        // weightsᵀ · grad uses the pre-update weights.
        assert_eq!(input_grad.to_vec(), vec![1.0, 2.0]);
        // weights -= 0.1 * [3, 4]
        let w = d.weights().to_vec();
        assert!((w[0] - 0.7).abs() < 1e-12);
        assert!((w[1] - 1.6).abs() < 1e-12);
        assert!((d.bias().get(0, 0) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn backward_rejects_wrong_gradient_shape() {
        let mut d = DenseLayer::new(2, 3, &mut StdRng::seed_from_u64(1));
        d.forward(&Matrix::zeros(2, 1)).unwrap();
        assert!(d.backward(&Matrix::zeros(2, 1), 0.1).is_err());
    }

    #[test]
    fn xavier_starts_with_zero_bias() {
        let d = DenseLayer::xavier(4, 2, &mut StdRng::seed_from_u64(5));
        assert_eq!(d.weights().shape(), (2, 4));
        assert_eq!(d.bias(), &Matrix::zeros(2, 1));
        assert!(d.is_finite());
    }

    #[test]
    fn from_parameters_checks_bias_shape() {
        let w = Matrix::zeros(2, 3);
        assert!(DenseLayer::from_parameters(w.clone(), Matrix::zeros(3, 1)).is_err());
        assert!(DenseLayer::from_parameters(w, Matrix::zeros(2, 1)).is_ok());
    }
}
