//! Loads a labeled directory tree of digit images.
//!
//! The immediate subdirectories of the root name the classes; every file
//! under a class directory must decode as an image. Images are converted to
//! grayscale, resized to 28x28, and their intensities scaled into [0, 1].

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};

use crate::error::{PipelineError, Result};

pub const WIDTH: usize = 28;
pub const HEIGHT: usize = 28;

/// A single grayscale sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitImage {
    /// Row-major, `HEIGHT * WIDTH` values in [0, 1].
    pub pixels: Vec<f32>,
}

/// Walks `root` and returns the decoded images together with their
/// subdirectory-derived labels.
///
/// The two sequences stay index-aligned: `images[i]` was read from a file
/// under the directory named `labels[i]`. Any unreadable or undecodable
/// file aborts the whole load; nothing is skipped.
pub fn load_digit_tree<P: AsRef<Path>>(root: P) -> Result<(Vec<DigitImage>, Vec<String>)> {
    let root = root.as_ref();
    let mut images = Vec::new();
    let mut labels = Vec::new();

    for class_dir in sorted_entries(root)? {
        let label = class_dir
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();

        for file in sorted_entries(&class_dir)? {
            images.push(decode(&file)?);
            labels.push(label.clone());
        }
    }

    if images.is_empty() {
        return Err(PipelineError::EmptyDataset(root.to_path_buf()));
    }

    Ok((images, labels))
}

/// Directory entries in name order, so the sample order (and with it the
/// seeded split downstream) is stable across runs and filesystems.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PipelineError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    paths.sort();

    Ok(paths)
}

fn decode(path: &Path) -> Result<DigitImage> {
    let gray = image::open(path)
        .map_err(|source| PipelineError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_luma8();

    let resized = imageops::resize(&gray, WIDTH as u32, HEIGHT as u32, FilterType::Nearest);
    let pixels = resized.pixels().map(|p| p.0[0] as f32 / 255.0).collect();

    Ok(DigitImage { pixels })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_is_an_io_error() {
        let err = load_digit_tree("/definitely/not/a/real/path").unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
