pub mod dataset;
pub mod image_folder;

pub use dataset::{Dataset, Sample};
pub use image_folder::load_image_folder;
