use std::fs;
use std::path::{Path, PathBuf};

use crate::data::dataset::{Dataset, Sample};
use crate::error::{NnError, Result};
use crate::features::pipeline::FeaturePipeline;

const SUPPORTED_FILES: [&str; 4] = ["bmp", "jpg", "jpeg", "png"];

/// Loads a binary image-classification dataset laid out as
///
/// ```text
/// root/
///   normal/    *.jpg ...   -> label 0
///   potholes/  *.png ...   -> label 1
/// ```
///
/// Class directories are sorted by name: the first is label 0, the second
/// label 1. Exactly two are required. Files with unsupported extensions are
/// skipped. Samples come out grouped by class, in file-name order.
pub fn load_image_folder<P: AsRef<Path>>(root: P, pipeline: &FeaturePipeline) -> Result<Dataset> {
    let root = root.as_ref();
    let classes = class_dirs(root)?;
    if classes.len() != 2 {
        return Err(NnError::config(format!(
            "{} must contain exactly two class directories, found {}",
            root.display(),
            classes.len()
        )));
    }

    let mut dataset = Dataset::new(pipeline.feature_size());
    for (label, dir) in classes.iter().enumerate() {
        let files = image_files(dir)?;
        log::info!("class {} ({}): {} images", label, dir.display(), files.len());
        for file in files {
            let input = pipeline.preprocess_path(&file)?;
            dataset.push(Sample { input, label: label as f64 })?;
        }
    }

    if dataset.is_empty() {
        return Err(NnError::config(format!("no images found under {}", root.display())));
    }

    let names: Vec<String> = classes.iter().map(|dir| dir_name(dir)).collect();
    Ok(dataset.with_class_names(names[0].clone(), names[1].clone()))
}

fn class_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if is_supported(&path) {
            files.push(path);
        } else {
            log::debug!("skipping unsupported file {}", path.display());
        }
    }
    files.sort();
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_FILES.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma};

    fn write_image(path: &Path, value: u8) {
        GrayImage::from_pixel(8, 8, Luma([value]))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    #[test]
    fn labels_follow_sorted_class_names() {
        let dir = tempfile::tempdir().unwrap();
        let normal = dir.path().join("normal");
        let potholes = dir.path().join("potholes");
        fs::create_dir(&normal).unwrap();
        fs::create_dir(&potholes).unwrap();
        write_image(&normal.join("a.png"), 250);
        write_image(&normal.join("b.png"), 240);
        write_image(&potholes.join("c.png"), 10);
        fs::write(potholes.join("notes.txt"), "ignored").unwrap();

        let pipeline = FeaturePipeline::new(4, 4).unwrap();
        let data = load_image_folder(dir.path(), &pipeline).unwrap();

        assert_eq!(data.len(), 3);
        assert_eq!(data.feature_size(), 16);
        assert_eq!(data.positives(), 1);
        assert_eq!(data.samples()[2].label, 1.0);
        let names = data.class_names().unwrap();
        assert_eq!(names[0], "normal");
        assert_eq!(names[1], "potholes");
    }

    #[test]
    fn extension_check_ignores_case() {
        assert!(is_supported(Path::new("road/IMG_001.JPG")));
        assert!(is_supported(Path::new("road/a.jpeg")));
        assert!(!is_supported(Path::new("road/a.gif")));
        assert!(!is_supported(Path::new("road/README")));
    }

    #[test]
    fn requires_two_classes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("only")).unwrap();
        let pipeline = FeaturePipeline::new(4, 4).unwrap();
        assert!(matches!(
            load_image_folder(dir.path(), &pipeline),
            Err(NnError::Configuration(_))
        ));
    }

    #[test]
    fn empty_class_folders_are_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        let pipeline = FeaturePipeline::new(4, 4).unwrap();
        assert!(load_image_folder(dir.path(), &pipeline).is_err());
    }
}
