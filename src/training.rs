//! The supervised training loop and the held-out evaluation pass.

use burn::data::dataloader::{DataLoaderBuilder, Progress};
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdaGradConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use burn::train::ClassificationOutput;
use burn::train::metric::{Adaptor, AccuracyMetric, LossMetric, Metric, MetricMetadata, Numeric};

use crate::config::PipelineConfig;
use crate::dataset::{DigitBatch, DigitBatcher, DigitDataset};
use crate::model::ConvNet;

/// Scalar outcome of a pass over one partition.
#[derive(Debug, Clone, Copy)]
pub struct Metrics {
    /// Mean cross-entropy loss.
    pub loss: f64,
    /// Mean categorical accuracy, as a percentage.
    pub accuracy: f64,
}

impl<B: Backend> ConvNet<B> {
    fn forward_classification(&self, batch: DigitBatch<B>) -> ClassificationOutput<B> {
        let output = self.forward(batch.images);
        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), batch.classes.clone());

        ClassificationOutput::new(loss, output, batch.classes)
    }
}

/// Runs the fixed-length training schedule and returns the trained network
/// together with the final epoch's averaged metrics.
///
/// One epoch is a full pass over `train_set` in shuffled batches. There is
/// no early stopping and no checkpointing; the schedule always runs to
/// completion. Numerical divergence is not detected here, it shows up in
/// the reported metrics.
pub fn train<AutoB: AutodiffBackend>(
    mut model: ConvNet<AutoB>,
    train_set: DigitDataset,
    config: &PipelineConfig,
) -> (ConvNet<AutoB>, Metrics) {
    let dataloader = DataLoaderBuilder::new(DigitBatcher::default())
        .batch_size(config.batch_size)
        .shuffle(config.random_seed)
        .num_workers(config.num_workers)
        .build(train_set);

    let mut optim = AdaGradConfig::new().init();
    let mut loss_metric = LossMetric::<AutoB>::new();
    let mut accuracy_metric = AccuracyMetric::<AutoB>::new();

    let num_items = dataloader.num_items();
    let mut metadata = MetricMetadata {
        progress: Progress {
            items_processed: 0,
            items_total: num_items,
        },
        epoch: 1,
        epoch_total: config.epochs,
        iteration: 0,
        lr: Some(config.learning_rate),
    };

    let mut metrics = Metrics {
        loss: 0.0,
        accuracy: 0.0,
    };

    for epoch in 1..=config.epochs {
        metadata.epoch = epoch;
        metadata.progress = Progress {
            items_processed: 0,
            items_total: num_items,
        };
        loss_metric.clear();
        accuracy_metric.clear();

        for batch in dataloader.iter() {
            metadata.iteration += 1;
            metadata.progress.items_processed += batch.classes.dims()[0];

            let output = model.forward_classification(batch);
            loss_metric.update(&output.adapt(), &metadata);
            accuracy_metric.update(&output.adapt(), &metadata);

            let grads = GradientsParams::from_grads(output.loss.backward(), &model);
            model = optim.step(config.learning_rate, model, grads);
        }

        metrics = Metrics {
            loss: loss_metric.value(),
            accuracy: accuracy_metric.value(),
        };
        println!(
            "epoch {epoch}/{}: loss {:.4}, accuracy {:.2}%",
            config.epochs, metrics.loss, metrics.accuracy
        );
    }

    (model, metrics)
}

/// Scores the frozen network over the held-out partition.
pub fn evaluate<B: Backend>(
    model: &ConvNet<B>,
    test_set: DigitDataset,
    config: &PipelineConfig,
) -> Metrics {
    let dataloader = DataLoaderBuilder::new(DigitBatcher::default())
        .batch_size(config.batch_size)
        .num_workers(config.num_workers)
        .build(test_set);

    let mut loss_metric = LossMetric::<B>::new();
    let mut accuracy_metric = AccuracyMetric::<B>::new();

    let num_items = dataloader.num_items();
    let mut metadata = MetricMetadata {
        progress: Progress {
            items_processed: 0,
            items_total: num_items,
        },
        epoch: 1,
        epoch_total: 1,
        iteration: 0,
        lr: None,
    };

    for batch in dataloader.iter() {
        metadata.iteration += 1;
        metadata.progress.items_processed += batch.classes.dims()[0];

        let output = model.forward_classification(batch);
        loss_metric.update(&output.adapt(), &metadata);
        accuracy_metric.update(&output.adapt(), &metadata);
    }

    Metrics {
        loss: loss_metric.value(),
        accuracy: accuracy_metric.value(),
    }
}
