use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Binary cross-entropy, paired with a Sigmoid output.
pub struct BceLoss;

/// Predictions are clamped into `[EPS, 1 - EPS]` before both the loss and
/// its derivative, so the two always see the same value.
pub const EPS: f64 = 1e-7;

impl BceLoss {
    pub fn clamp(p: f64) -> f64 {
        p.clamp(EPS, 1.0 - EPS)
    }

    /// -mean(y·ln(p) + (1-y)·ln(1-p)) over all elements.
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        check(predicted, expected)?;
        let n = (predicted.rows() * predicted.cols()) as f64;
        let total: f64 = predicted.to_vec().into_iter().zip(expected.to_vec())
            .map(|(p, y)| term(y, BceLoss::clamp(p)))
            .sum();
        Ok(total / n)
    }

    /// Element-wise ∂L/∂p: (p - y) / (p·(1 - p)).
    ///
    /// Not divided by the element count: with a single sigmoid output this
    /// is exactly the gradient of the per-sample loss.
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        check(predicted, expected)?;
        let mut grad = Matrix::zeros(predicted.rows(), predicted.cols());
        for i in 0..predicted.rows() {
            for j in 0..predicted.cols() {
                grad.set(i, j, slope(expected.get(i, j), BceLoss::clamp(predicted.get(i, j))));
            }
        }
        Ok(grad)
    }

    pub fn loss_scalar(y_true: f64, y_pred: f64) -> Result<f64> {
        check_scalar(y_true, y_pred)?;
        Ok(term(y_true, BceLoss::clamp(y_pred)))
    }

    pub fn derivative_scalar(y_true: f64, y_pred: f64) -> Result<f64> {
        check_scalar(y_true, y_pred)?;
        Ok(slope(y_true, BceLoss::clamp(y_pred)))
    }
}

fn term(y: f64, p: f64) -> f64 {
    -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
}

fn slope(y: f64, p: f64) -> f64 {
    (p - y) / (p * (1.0 - p))
}

fn check(predicted: &Matrix, expected: &Matrix) -> Result<()> {
    if predicted.shape() != expected.shape() {
        return Err(NnError::ShapeMismatch {
            op: "bce",
            expected: expected.shape(),
            found: predicted.shape(),
        });
    }
    if predicted.has_nan() || expected.has_nan() {
        return Err(NnError::NumericalInstability(
            "NaN reached binary cross-entropy".to_owned(),
        ));
    }
    Ok(())
}

fn check_scalar(y_true: f64, y_pred: f64) -> Result<()> {
    if y_true.is_nan() || y_pred.is_nan() {
        return Err(NnError::NumericalInstability(
            "NaN reached binary cross-entropy".to_owned(),
        ));
    }
    Ok(())
}
