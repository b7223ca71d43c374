pub mod pipeline;

pub use pipeline::FeaturePipeline;
