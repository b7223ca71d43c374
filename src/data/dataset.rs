use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// One labelled feature vector, stored as an `(n, 1)` column.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub input: Matrix,
    pub label: f64,
}

impl Sample {
    /// Label must be exactly 0 or 1; features must be non-empty and finite.
    pub fn new(features: Vec<f64>, label: f64) -> Result<Sample> {
        if label != 0.0 && label != 1.0 {
            return Err(NnError::config(format!("label must be 0 or 1, got {}", label)));
        }
        if features.iter().any(|x| !x.is_finite()) {
            return Err(NnError::config("sample contains non-finite features"));
        }
        Ok(Sample { input: Matrix::column(features)?, label })
    }

    pub fn feature_size(&self) -> usize {
        self.input.rows()
    }

    /// The label as a `(1, 1)` target matrix.
    pub fn target(&self) -> Matrix {
        let mut target = Matrix::zeros(1, 1);
        target.set(0, 0, self.label);
        target
    }
}

/// Ordered samples of equal feature length. Training walks them in this
/// order; call `shuffle` first if a random order is wanted.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    samples: Vec<Sample>,
    feature_size: usize,
    class_names: Option<[String; 2]>,
}

impl Dataset {
    pub fn new(feature_size: usize) -> Dataset {
        Dataset { samples: Vec::new(), feature_size, class_names: None }
    }

    /// Builds a dataset from `(features, label)` pairs. The first pair fixes
    /// the feature size.
    pub fn from_pairs<I>(pairs: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = (Vec<f64>, f64)>,
    {
        let mut dataset: Option<Dataset> = None;
        for (features, label) in pairs {
            let sample = Sample::new(features, label)?;
            dataset
                .get_or_insert_with(|| Dataset::new(sample.feature_size()))
                .push(sample)?;
        }
        dataset.ok_or_else(|| NnError::config("dataset must contain at least one sample"))
    }

    pub fn push(&mut self, sample: Sample) -> Result<()> {
        if sample.feature_size() != self.feature_size {
            return Err(NnError::config(format!(
                "sample has {} features, dataset expects {}",
                sample.feature_size(), self.feature_size
            )));
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn with_class_names(mut self, negative: String, positive: String) -> Dataset {
        self.class_names = Some([negative, positive]);
        self
    }

    pub fn class_names(&self) -> Option<&[String; 2]> {
        self.class_names.as_ref()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn positives(&self) -> usize {
        self.samples.iter().filter(|s| s.label == 1.0).count()
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.samples.shuffle(rng);
    }

    /// Random split into `(train, validation)`; the training part gets
    /// `floor(len * train_ratio)` samples.
    pub fn split<R: Rng + ?Sized>(&self, train_ratio: f64, rng: &mut R) -> Result<(Dataset, Dataset)> {
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            return Err(NnError::config(format!(
                "train ratio must lie in (0, 1), got {}",
                train_ratio
            )));
        }
        let train_len = (self.samples.len() as f64 * train_ratio) as usize;
        if train_len == 0 {
            return Err(NnError::config(format!(
                "{} samples leave nothing to train on at ratio {}",
                self.samples.len(), train_ratio
            )));
        }

        let mut indices: Vec<usize> = (0..self.samples.len()).collect();
        indices.shuffle(rng);

        let mut train = self.empty_like();
        let mut validation = self.empty_like();
        for (n, &idx) in indices.iter().enumerate() {
            let sample = self.samples[idx].clone();
            if n < train_len {
                train.samples.push(sample);
            } else {
                validation.samples.push(sample);
            }
        }
        Ok((train, validation))
    }

    fn empty_like(&self) -> Dataset {
        Dataset {
            samples: Vec::new(),
            feature_size: self.feature_size,
            class_names: self.class_names.clone(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn toy(n: usize) -> Dataset {
        Dataset::from_pairs((0..n).map(|i| (vec![i as f64, 1.0], (i % 2) as f64))).unwrap()
    }

    #[test]
    fn sample_validates_label_and_features() {
        assert!(Sample::new(vec![1.0], 0.5).is_err());
        assert!(Sample::new(vec![f64::NAN], 1.0).is_err());
        assert!(Sample::new(vec![], 1.0).is_err());
        let s = Sample::new(vec![0.2, 0.4], 1.0).unwrap();
        assert_eq!(s.input.shape(), (2, 1));
        assert_eq!(s.target().get(0, 0), 1.0);
    }

    #[test]
    fn push_rejects_other_feature_sizes() {
        let mut d = toy(2);
        assert!(d.push(Sample::new(vec![1.0, 2.0, 3.0], 0.0).unwrap()).is_err());
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn from_pairs_rejects_empty() {
        assert!(Dataset::from_pairs(Vec::new()).is_err());
    }

    #[test]
    fn split_partitions_all_samples() {
        let d = toy(10);
        let (train, val) = d.split(0.8, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(val.len(), 2);
        assert_eq!(train.positives() + val.positives(), d.positives());
    }

    #[test]
    fn split_rejects_bad_ratio() {
        let d = toy(3);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(d.split(1.0, &mut rng).is_err());
        assert!(d.split(0.0, &mut rng).is_err());
        assert!(d.split(0.2, &mut rng).is_err());
    }

    #[test]
    fn shuffle_keeps_samples() {
        let mut d = toy(6);
        d.shuffle(&mut StdRng::seed_from_u64(9));
        assert_eq!(d.len(), 6);
        assert_eq!(d.positives(), 3);
    }
}
