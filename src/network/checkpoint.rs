use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::network::metadata::ModelMetadata;
use crate::network::network::Network;

pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

/// On-disk form of a trained model: every layer in order (Dense weights and
/// biases included) plus optional metadata. Cached forward inputs are not
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub format_version: u32,
    #[serde(default)]
    pub metadata: ModelMetadata,
    pub network: Network,
}

impl Checkpoint {
    pub fn new(network: Network) -> Checkpoint {
        Checkpoint {
            format_version: CHECKPOINT_FORMAT_VERSION,
            metadata: ModelMetadata::default(),
            network,
        }
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Checkpoint {
        self.metadata = metadata;
        self
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Checkpoint> {
        let checkpoint: Checkpoint = serde_json::from_str(json)?;
        checkpoint.validate()
    }

    /// Serializes the checkpoint to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        log::debug!("checkpoint written to {}", path);
        Ok(())
    }

    /// Deserializes a checkpoint previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<Checkpoint> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let checkpoint: Checkpoint = serde_json::from_reader(reader)?;
        checkpoint.validate()
    }

    fn validate(self) -> Result<Checkpoint> {
        if self.format_version != CHECKPOINT_FORMAT_VERSION {
            return Err(NnError::config(format!(
                "unsupported checkpoint version {} (expected {})",
                self.format_version, CHECKPOINT_FORMAT_VERSION
            )));
        }
        if !self.network.is_finite() {
            return Err(NnError::config("checkpoint contains non-finite parameters"));
        }
        Ok(self)
    }
}
