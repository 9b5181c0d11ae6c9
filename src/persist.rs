//! Export and reload of trained networks.
//!
//! An artifact is two files under the artifact directory, both named by the
//! run's tag: `<tag>.mpk` holds the weights and `<tag>.json` the
//! architecture that shaped them. External inference consumers look the
//! pair up by tag.

use std::path::{Path, PathBuf};

use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};

use crate::error::{PipelineError, Result};
use crate::model::{ConvNet, ConvNetConfig};

type ArtifactRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Writes the trained network under `dir`, tagged `tag`, and returns the
/// weight-file path.
///
/// The write is all-or-nothing from the caller's perspective: any failure
/// surfaces as an error and nothing is rolled back.
pub fn save<B: Backend>(
    model: ConvNet<B>,
    model_config: &ConvNetConfig,
    dir: &Path,
    tag: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let stem = dir.join(tag);
    model
        .save_file(&stem, &ArtifactRecorder::new())
        .map_err(|source| PipelineError::Record {
            path: stem.with_extension("mpk"),
            source,
        })?;

    let config_path = stem.with_extension("json");
    model_config
        .save(&config_path)
        .map_err(|source| PipelineError::Io {
            path: config_path.clone(),
            source,
        })?;

    Ok(stem.with_extension("mpk"))
}

/// Reloads a previously saved network by tag.
pub fn load<B: Backend>(dir: &Path, tag: &str, device: &B::Device) -> Result<ConvNet<B>> {
    let stem = dir.join(tag);
    let config_path = stem.with_extension("json");
    let model_config =
        ConvNetConfig::load(&config_path).map_err(|source| PipelineError::Config {
            path: config_path,
            source,
        })?;

    model_config
        .init(device)
        .load_file(&stem, &ArtifactRecorder::new(), device)
        .map_err(|source| PipelineError::Record {
            path: stem.with_extension("mpk"),
            source,
        })
}
