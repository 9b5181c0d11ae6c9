//! A single-shot training pipeline for a convolutional digit classifier.
//!
//! The pipeline is linear: load a labeled image directory, one-hot encode
//! and split the samples, train the network, score it on the held-out
//! partition, and export the trained model for inference consumers.

pub mod backend;
pub mod config;
pub mod dataset;
pub mod error;
pub mod model;
pub mod persist;
pub mod training;

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::dataset::{
        DigitBatch, DigitBatcher, DigitDataset, DigitImage, DigitItem, DigitSplit, assemble,
        load_digit_tree,
    };
    pub use crate::error::{PipelineError, Result};
    pub use crate::model::{ConvNet, ConvNetConfig};
    pub use crate::training::{Metrics, evaluate, train};
}
