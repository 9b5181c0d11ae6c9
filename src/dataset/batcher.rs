//! Turns dataset items into the 4-d tensor layout the network consumes.

use burn::data::dataloader::batcher::Batcher;
use burn::prelude::*;

use crate::dataset::assemble::{DigitItem, NUM_CLASSES};
use crate::dataset::loader::{HEIGHT, WIDTH};

#[derive(Clone, Default)]
pub struct DigitBatcher {}

/// One batch of samples, on the training device.
#[derive(Clone, Debug)]
pub struct DigitBatch<B: Backend> {
    /// # Shape
    /// [batch_size, 1, HEIGHT, WIDTH]
    pub images: Tensor<B, 4>,

    /// The one-hot rows of the batch.
    ///
    /// # Shape
    /// [batch_size, NUM_CLASSES]
    pub targets: Tensor<B, 2>,

    /// Class indices derived from the one-hot rows, consumed by the loss
    /// and the accuracy metric.
    ///
    /// # Shape
    /// [batch_size]
    pub classes: Tensor<B, 1, Int>,
}

impl<B: Backend> Batcher<B, DigitItem, DigitBatch<B>> for DigitBatcher {
    fn batch(&self, items: Vec<DigitItem>, device: &B::Device) -> DigitBatch<B> {
        let classes = items
            .iter()
            .map(|item| {
                Tensor::<B, 1, Int>::from_data(
                    [(item.class_index() as i64).elem::<B::IntElem>()],
                    device,
                )
            })
            .collect();

        let (pixels, targets): (Vec<_>, Vec<_>) = items
            .into_iter()
            .map(|item| (item.pixels, item.target))
            .unzip();

        let images = pixels
            .into_iter()
            .map(|pixels| TensorData::new(pixels, [1, 1, HEIGHT, WIDTH]).convert::<B::FloatElem>())
            .map(|data| Tensor::<B, 4>::from_data(data, device))
            .collect();

        let targets = targets
            .into_iter()
            .map(|row| TensorData::new(row, [1, NUM_CLASSES]).convert::<B::FloatElem>())
            .map(|data| Tensor::<B, 2>::from_data(data, device))
            .collect();

        DigitBatch {
            images: Tensor::cat(images, 0),
            targets: Tensor::cat(targets, 0),
            classes: Tensor::cat(classes, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::assemble::one_hot;

    type B = burn::backend::NdArray<f32>;

    fn item(digit: usize, offset: f32) -> DigitItem {
        DigitItem {
            pixels: (0..HEIGHT * WIDTH)
                .map(|i| (i as f32 + offset) / 2000.0)
                .collect(),
            target: one_hot(digit),
        }
    }

    #[test]
    fn batching_preserves_sample_count_and_pixel_values() {
        let items = vec![item(0, 0.0), item(3, 1.0), item(9, 2.0)];
        let expected: Vec<f32> = items.iter().flat_map(|i| i.pixels.clone()).collect();

        let device = <B as Backend>::Device::default();
        let batch: DigitBatch<B> = DigitBatcher::default().batch(items, &device);

        assert_eq!(batch.images.dims(), [3, 1, HEIGHT, WIDTH]);
        let flat = batch.images.into_data().to_vec::<f32>().unwrap();
        assert_eq!(flat, expected);
    }

    #[test]
    fn classes_follow_the_one_hot_rows() {
        let items = vec![item(2, 0.0), item(7, 1.0)];
        let device = <B as Backend>::Device::default();
        let batch: DigitBatch<B> = DigitBatcher::default().batch(items, &device);

        assert_eq!(batch.targets.dims(), [2, NUM_CLASSES]);
        let classes = batch.classes.into_data().to_vec::<i64>().unwrap();
        assert_eq!(classes, vec![2, 7]);

        let targets = batch.targets.into_data().to_vec::<f32>().unwrap();
        let mut expected = one_hot(2);
        expected.extend(one_hot(7));
        assert_eq!(targets, expected);
    }
}
