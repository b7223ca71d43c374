use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

use crate::error::{NnError, Result};

/// Dense row-major 2D buffer. Column vectors are `(n, 1)`.
///
/// The shape is fixed once built; every binary operation checks it and
/// returns `NnError::ShapeMismatch` instead of padding or truncating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix{
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Builds a matrix from rows. Rejects empty input and ragged rows.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map(|r| r.len()).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(NnError::config("matrix must have at least one row and one column"));
        }
        if let Some(bad) = data.iter().find(|r| r.len() != cols) {
            return Err(NnError::ShapeMismatch {
                op: "from_data",
                expected: (rows, cols),
                found: (rows, bad.len()),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Wraps a flat feature vector as an `(n, 1)` column.
    pub fn column(values: Vec<f64>) -> Result<Matrix> {
        if values.is_empty() {
            return Err(NnError::config("column vector must not be empty"));
        }
        Ok(Matrix {
            rows: values.len(),
            cols: 1,
            data: values.into_iter().map(|v| vec![v]).collect(),
        })
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // (0, 1] keeps ln() finite.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Every entry drawn from N(0, 1).
    pub fn random_normal<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal_scaled(rows, cols, 1.0, rng)
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / cols)).
    ///
    /// Keeps the variance of activations and gradients roughly equal across
    /// Sigmoid/Tanh layers. `cols` is the fan-in.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (1.0 / cols.max(1) as f64).sqrt();
        Matrix::normal_scaled(rows, cols, std_dev, rng)
    }

    fn normal_scaled<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row][col] = value;
    }

    pub fn row_slices(&self) -> &[Vec<f64>] {
        &self.data
    }

    /// Row-major flatten.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().flatten().all(|x| x.is_finite())
    }

    pub fn has_nan(&self) -> bool {
        self.data.iter().flatten().any(|x| x.is_nan())
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Matrix product `self · rhs`; requires `self.cols == rhs.rows`.
    pub fn dot(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(NnError::ShapeMismatch {
                op: "dot",
                expected: (self.cols, rhs.cols),
                found: rhs.shape(),
            });
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        Ok(res)
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "add", |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "sub", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "hadamard", |a, b| a * b)
    }

    /// `self -= factor * rhs`, in place. Used for parameter updates so the
    /// parameter buffers are never reallocated.
    pub fn sub_assign_scaled(&mut self, rhs: &Matrix, factor: f64) -> Result<()> {
        self.check_same_shape(rhs, "sub_assign_scaled")?;
        for (row, rhs_row) in self.data.iter_mut().zip(rhs.data.iter()) {
            for (x, g) in row.iter_mut().zip(rhs_row.iter()) {
                *x -= factor * g;
            }
        }
        Ok(())
    }

    fn zip_with<F>(&self, rhs: &Matrix, op: &'static str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_shape(rhs, op)?;
        let data = self.data.iter().zip(rhs.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(&x, &y)| f(x, y)).collect()
            })
            .collect();
        Ok(Matrix { rows: self.rows, cols: self.cols, data })
    }

    fn check_same_shape(&self, rhs: &Matrix, op: &'static str) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(NnError::ShapeMismatch {
                op,
                expected: self.shape(),
                found: rhs.shape(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = NnError;

    fn try_from(data: Vec<Vec<f64>>) -> Result<Matrix> {
        Matrix::from_data(data)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(matrix: Matrix) -> Self {
        matrix.data
    }
}
