use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Online stochastic gradient descent: parameters move after every sample.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Result<Sgd> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(NnError::config(format!(
                "learning rate must be positive and finite, got {}",
                learning_rate
            )));
        }
        Ok(Sgd { learning_rate })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Back-propagates `loss_gradient` through `network`, applying one
    /// update to every dense layer on the way.
    pub fn step(&self, network: &mut Network, loss_gradient: &Matrix) -> Result<Matrix> {
        network.backward(loss_gradient, self.learning_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_learning_rates() {
        assert!(Sgd::new(0.0).is_err());
        assert!(Sgd::new(-0.1).is_err());
        assert!(Sgd::new(f64::NAN).is_err());
        assert!(Sgd::new(f64::INFINITY).is_err());
        assert_eq!(Sgd::new(0.01).unwrap().learning_rate(), 0.01);
    }
}
