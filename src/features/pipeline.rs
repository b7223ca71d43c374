use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::network::metadata::InputType;
use crate::network::network::Network;

/// Turns decoded images into the flat column vectors the first dense layer
/// consumes: grayscale, resized to `width × height`, scaled to [0, 1],
/// flattened row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturePipeline {
    pub width: u32,
    pub height: u32,
}

impl FeaturePipeline {
    pub fn new(width: u32, height: u32) -> Result<FeaturePipeline> {
        if width == 0 || height == 0 {
            return Err(NnError::config(format!(
                "feature resolution must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(FeaturePipeline { width, height })
    }

    /// Recovers the pipeline recorded in a checkpoint's metadata.
    pub fn from_input_type(input_type: &InputType) -> Option<FeaturePipeline> {
        match *input_type {
            InputType::ImageGrayscale { width, height } => FeaturePipeline::new(width, height).ok(),
            InputType::Numeric => None,
        }
    }

    pub fn feature_size(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn input_type(&self) -> InputType {
        InputType::ImageGrayscale { width: self.width, height: self.height }
    }

    /// Configuration error unless the network's first dense layer takes
    /// exactly `feature_size()` inputs.
    pub fn check_network(&self, network: &Network) -> Result<()> {
        network.ensure_input_size(self.feature_size())
    }

    pub fn features(&self, img: &DynamicImage) -> Vec<f64> {
        let gray = if img.dimensions() == (self.width, self.height) {
            img.to_luma8()
        } else {
            img.resize_exact(self.width, self.height, FilterType::Lanczos3).to_luma8()
        };
        gray.pixels().map(|p| p.0[0] as f64 / 255.0).collect()
    }

    pub fn preprocess(&self, img: &DynamicImage) -> Result<Matrix> {
        Matrix::column(self.features(img))
    }

    /// Decodes PNG/JPEG/BMP/GIF bytes, then preprocesses.
    pub fn preprocess_bytes(&self, bytes: &[u8]) -> Result<Matrix> {
        let img = image::load_from_memory(bytes)?;
        self.preprocess(&img)
    }

    pub fn preprocess_path<P: AsRef<Path>>(&self, path: P) -> Result<Matrix> {
        let img = image::open(path)?;
        self.preprocess(&img)
    }
}
