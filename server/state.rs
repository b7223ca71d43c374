use std::sync::{Arc, Mutex};

use pothole_nn::{Checkpoint, FeaturePipeline, ModelMetadata, Network, NnError};

/// A checkpoint ready to serve: the network plus the preprocessing it was
/// trained with.
pub struct LoadedModel {
    /// Forward passes overwrite each layer's cached input, so every
    /// inference takes the lock.
    pub network: Mutex<Network>,
    pub pipeline: FeaturePipeline,
    pub metadata: ModelMetadata,
}

impl LoadedModel {
    pub fn load(path: &str) -> Result<LoadedModel, NnError> {
        let Checkpoint { metadata, network, .. } = Checkpoint::load_json(path)?;
        let pipeline = metadata
            .input_type
            .as_ref()
            .and_then(FeaturePipeline::from_input_type)
            .ok_or_else(|| NnError::Configuration(format!(
                "{} does not record an image input type",
                path
            )))?;
        pipeline.check_network(&network)?;
        Ok(LoadedModel { network: Mutex::new(network), pipeline, metadata })
    }
}

pub struct ServerState {
    pub model_path: String,
    pub model: Option<LoadedModel>,
}

pub type SharedState = Arc<ServerState>;

impl ServerState {
    /// Loads the model at `model_path`. A missing or broken checkpoint is
    /// logged and leaves the server running without a model.
    pub fn new(model_path: String) -> ServerState {
        let model = match LoadedModel::load(&model_path) {
            Ok(model) => {
                log::info!(
                    "model loaded from {} ({}x{} grayscale input)",
                    model_path, model.pipeline.width, model.pipeline.height
                );
                Some(model)
            }
            Err(e) => {
                log::error!("error loading model from {}: {}", model_path, e);
                None
            }
        };
        ServerState { model_path, model }
    }
}
