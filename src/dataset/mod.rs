pub mod assemble;
pub mod batcher;
pub mod loader;

pub use assemble::{DigitDataset, DigitItem, DigitSplit, NUM_CLASSES, assemble, one_hot};
pub use batcher::{DigitBatch, DigitBatcher};
pub use loader::{DigitImage, HEIGHT, WIDTH, load_digit_tree};
