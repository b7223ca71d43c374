use serde::{Deserialize, Serialize};

/// Describes how to interpret the input fed to a Network.
/// Stored in the checkpoint; the server reads it to preprocess uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputType {
    /// Raw feature vector.
    Numeric,
    /// Grayscale image resized to width×height, normalized to [0, 1].
    ImageGrayscale { width: u32, height: u32 },
}

/// Optional annotations attached to a saved Network.
/// All fields are Option<> so bare checkpoints deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    pub description: Option<String>,
    pub input_type: Option<InputType>,
    /// Class names for label 0 and label 1, e.g. ["normal", "potholes"].
    pub output_labels: Option<Vec<String>>,
}

impl ModelMetadata {
    /// Name of the class a decision maps to, if labels were recorded.
    pub fn label_for(&self, decision: bool) -> Option<&str> {
        self.output_labels
            .as_ref()
            .and_then(|labels| labels.get(usize::from(decision)))
            .map(String::as_str)
    }
}
