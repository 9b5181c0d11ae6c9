//! The convolutional digit classifier.
//!
//! Two convolution stages (each two ReLU convolutions, a 2x2 max-pool, then
//! dropout), a dense hidden layer on the flattened feature map, and a
//! 10-way output head. The head emits logits; [`ConvNet::predict`] turns
//! them into a probability distribution.

use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::tensor::activation::softmax;

use crate::dataset::{HEIGHT, NUM_CLASSES, WIDTH};

#[derive(Config, Debug)]
pub struct ConvNetConfig {
    /// Kernel of every convolution layer.
    #[config(default = "[4, 4]")]
    pub kernel_size: [usize; 2],

    /// Width of the dense layer between the feature map and the output head.
    #[config(default = 64)]
    pub hidden_size: usize,

    #[config(default = 0.2)]
    pub dropout_early: f64,

    #[config(default = 0.25)]
    pub dropout_late: f64,
}

#[derive(Module, Debug)]
pub struct ConvNet<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    conv3: Conv2d<B>,
    conv4: Conv2d<B>,
    pool: MaxPool2d,
    dropout_early: Dropout,
    dropout_late: Dropout,
    fc1: Linear<B>,
    fc2: Linear<B>,
    activation: Relu,
}

impl ConvNetConfig {
    /// Returns the initialized network.
    ///
    /// The architecture is fixed at construction; nothing about it changes
    /// based on the data that later flows through it.
    pub fn init<B: Backend>(&self, device: &B::Device) -> ConvNet<B> {
        let [h, w] = self.feature_map();

        ConvNet {
            conv1: Conv2dConfig::new([1, 32], self.kernel_size).init(device),
            conv2: Conv2dConfig::new([32, 64], self.kernel_size).init(device),
            conv3: Conv2dConfig::new([64, 64], self.kernel_size).init(device),
            conv4: Conv2dConfig::new([64, 64], self.kernel_size).init(device),
            pool: MaxPool2dConfig::new([2, 2]).init(),
            dropout_early: DropoutConfig::new(self.dropout_early).init(),
            dropout_late: DropoutConfig::new(self.dropout_late).init(),
            fc1: LinearConfig::new(64 * h * w, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, NUM_CLASSES).init(device),
            activation: Relu::new(),
        }
    }

    /// Height and width of the feature map after both convolution stages.
    ///
    /// Convolutions are unpadded with stride 1; each stage ends in a 2x2
    /// pool with stride 2.
    fn feature_map(&self) -> [usize; 2] {
        let [kh, kw] = self.kernel_size;
        let stage = |size: usize, k: usize| {
            assert!(
                size >= 2 * (k - 1) + 2,
                "kernel {k} does not fit a {size}-wide input"
            );
            let size = size - 2 * (k - 1);
            (size - 2) / 2 + 1
        };

        [stage(stage(HEIGHT, kh), kh), stage(stage(WIDTH, kw), kw)]
    }
}

impl<B: Backend> ConvNet<B> {
    /// # Shapes
    ///   - Input [batch_size, 1, HEIGHT, WIDTH]
    ///   - Output [batch_size, NUM_CLASSES], as logits
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.conv1.forward(images));
        let x = self.activation.forward(self.conv2.forward(x));
        let x = self.dropout_early.forward(self.pool.forward(x));

        let x = self.activation.forward(self.conv3.forward(x));
        let x = self.activation.forward(self.conv4.forward(x));
        let x = self.dropout_late.forward(self.pool.forward(x));

        let x = x.flatten::<2>(1, 3);
        let x = self.activation.forward(self.fc1.forward(x));
        self.fc2.forward(x)
    }

    /// Class-probability distribution for each sample; rows sum to 1.
    pub fn predict(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(images), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type B = burn::backend::NdArray<f32>;

    #[test]
    fn feature_map_tracks_the_kernel_size() {
        let config = ConvNetConfig::new();
        assert_eq!(config.feature_map(), [2, 2]);

        let config = ConvNetConfig::new().with_kernel_size([3, 3]);
        assert_eq!(config.feature_map(), [4, 4]);
    }

    #[test]
    fn forward_produces_one_logit_row_per_sample() {
        let device = <B as Backend>::Device::default();
        let model = ConvNetConfig::new().init::<B>(&device);
        let images = Tensor::<B, 4>::zeros([3, 1, HEIGHT, WIDTH], &device);

        assert_eq!(model.forward(images).dims(), [3, NUM_CLASSES]);
    }

    #[test]
    fn predictions_form_a_distribution() {
        let device = <B as Backend>::Device::default();
        let model = ConvNetConfig::new().init::<B>(&device);
        let images = Tensor::<B, 4>::random(
            [2, 1, HEIGHT, WIDTH],
            burn::tensor::Distribution::Uniform(0.0, 1.0),
            &device,
        );

        let probabilities = model.predict(images);
        let sums = probabilities.sum_dim(1).into_data().to_vec::<f32>().unwrap();
        assert_eq!(sums.len(), 2);
        for sum in sums {
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }
}
