//! One-hot encoding and the seeded train/test partition.

use burn::data::dataset::{Dataset, InMemDataset};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::dataset::loader::DigitImage;
use crate::error::{PipelineError, Result};

/// The label space is the ten decimal digits, fixed up front rather than
/// derived from whichever labels happen to be observed.
pub const NUM_CLASSES: usize = 10;

/// One sample ready for batching: normalized pixels paired with the one-hot
/// encoding of its digit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DigitItem {
    /// Row-major `HEIGHT * WIDTH` intensities in [0, 1].
    pub pixels: Vec<f32>,

    /// One-hot vector of length [`NUM_CLASSES`]; the single `1.0` sits at
    /// the digit's index.
    pub target: Vec<f32>,
}

impl DigitItem {
    /// Index of the `1.0` entry in the one-hot target.
    pub fn class_index(&self) -> usize {
        self.target
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// In-memory digit dataset, consumable by burn's data loader.
pub struct DigitDataset {
    dataset: InMemDataset<DigitItem>,
}

impl std::fmt::Debug for DigitDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitDataset")
            .field("len", &self.dataset.len())
            .finish()
    }
}

impl DigitDataset {
    pub fn new(items: Vec<DigitItem>) -> Self {
        Self {
            dataset: InMemDataset::new(items),
        }
    }
}

impl Dataset<DigitItem> for DigitDataset {
    fn get(&self, index: usize) -> Option<DigitItem> {
        self.dataset.get(index)
    }

    fn len(&self) -> usize {
        self.dataset.len()
    }
}

/// The two disjoint partitions produced by [`assemble`].
#[derive(Debug)]
pub struct DigitSplit {
    pub train: DigitDataset,
    pub test: DigitDataset,
}

/// One-hot encoding of a digit over the fixed class space.
pub fn one_hot(digit: usize) -> Vec<f32> {
    let mut row = vec![0.0; NUM_CLASSES];
    row[digit] = 1.0;
    row
}

/// Pairs every image with the one-hot encoding of its label and splits the
/// whole set once into train and test partitions.
///
/// The partition is a seeded shuffle of the sample indices: the same input
/// set and seed always produce the same assignment, no index lands in both
/// partitions, and each image keeps its own label across the split. The
/// partition ratio is fixed here and never revisited.
pub fn assemble(
    images: Vec<DigitImage>,
    labels: Vec<String>,
    config: &PipelineConfig,
) -> Result<DigitSplit> {
    debug_assert_eq!(images.len(), labels.len());

    if !(config.test_split_fraction > 0.0 && config.test_split_fraction < 1.0) {
        return Err(PipelineError::InvalidSplitFraction(
            config.test_split_fraction,
        ));
    }

    let mut items = Vec::with_capacity(images.len());
    for (image, label) in images.into_iter().zip(labels) {
        let digit: usize = label
            .parse()
            .map_err(|_| PipelineError::InvalidLabel(label.clone()))?;
        if digit >= NUM_CLASSES {
            return Err(PipelineError::InvalidLabel(label));
        }
        items.push(DigitItem {
            pixels: image.pixels,
            target: one_hot(digit),
        });
    }

    let mut indices: Vec<usize> = (0..items.len()).collect();
    let mut rng = StdRng::seed_from_u64(config.random_seed);
    indices.shuffle(&mut rng);

    let test_len = (items.len() as f64 * config.test_split_fraction).ceil() as usize;
    let mut in_test = vec![false; items.len()];
    for &index in indices.iter().take(test_len) {
        in_test[index] = true;
    }

    let mut train = Vec::with_capacity(items.len() - test_len);
    let mut test = Vec::with_capacity(test_len);
    for (index, item) in items.into_iter().enumerate() {
        if in_test[index] {
            test.push(item);
        } else {
            train.push(item);
        }
    }

    Ok(DigitSplit {
        train: DigitDataset::new(train),
        test: DigitDataset::new(test),
    })
}
