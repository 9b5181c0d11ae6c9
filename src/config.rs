use burn::prelude::*;

use crate::model::ConvNetConfig;

/// Tunable values for one training run.
///
/// Everything the pipeline reads is collected here and passed down
/// explicitly; no stage keeps hidden module-level state. The defaults are
/// the values the pipeline ships with; a JSON file with overrides can be
/// supplied on the command line.
#[derive(Config, Debug)]
pub struct PipelineConfig {
    /// Architecture of the network to train.
    pub model: ConvNetConfig,

    #[config(default = 128)]
    pub batch_size: usize,

    /// Number of full passes over the training partition.
    #[config(default = 5)]
    pub epochs: usize,

    /// Fraction of the loaded samples held out for evaluation.
    #[config(default = 0.3)]
    pub test_split_fraction: f64,

    /// Seed for the train/test partition and for batch shuffling.
    #[config(default = 111)]
    pub random_seed: u64,

    #[config(default = 1e-2)]
    pub learning_rate: f64,

    /// Worker threads for the data loader.
    #[config(default = 2)]
    pub num_workers: usize,
}
