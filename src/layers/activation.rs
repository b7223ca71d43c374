use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Shape-preserving element-wise nonlinearity. No learnable parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationLayer {
    function: ActivationFunction,
    #[serde(skip)]
    last_input: Option<Matrix>,
}

impl ActivationLayer {
    pub fn new(function: ActivationFunction) -> ActivationLayer {
        ActivationLayer { function, last_input: None }
    }

    pub fn sigmoid() -> ActivationLayer {
        ActivationLayer::new(ActivationFunction::Sigmoid)
    }

    pub fn function(&self) -> ActivationFunction {
        self.function
    }

    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let output = input.map(|x| self.function.function(x));
        self.last_input = Some(input.clone());
        Ok(output)
    }

    /// `output_gradient ⊙ f'(cached input)`. The learning rate is accepted
    /// so every layer shares one backward signature; it is unused here.
    pub fn backward(&mut self, output_gradient: &Matrix, _learning_rate: f64) -> Result<Matrix> {
        let input = self.last_input.as_ref().ok_or_else(|| {
            NnError::State(format!("{} backward called before forward", self.function.name()))
        })?;
        let derivative = input.map(|x| self.function.derivative(x));
        output_gradient.hadamard(&derivative)
    }
}
