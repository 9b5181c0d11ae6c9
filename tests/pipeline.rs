use std::collections::HashSet;
use std::path::Path;

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::module::AutodiffModule;
use burn::prelude::*;
use image::{GrayImage, Luma};
use temp_dir::TempDir;

use burn_digits::config::PipelineConfig;
use burn_digits::dataset::{
    DigitBatch, DigitBatcher, HEIGHT, NUM_CLASSES, WIDTH, assemble, load_digit_tree,
};
use burn_digits::error::PipelineError;
use burn_digits::model::ConvNetConfig;
use burn_digits::{persist, training};

type TestBackend = burn::backend::NdArray<f32>;
type TestAutoBackend = burn::backend::Autodiff<TestBackend>;

fn test_config() -> PipelineConfig {
    PipelineConfig::new(ConvNetConfig::new())
        .with_batch_size(8)
        .with_epochs(15)
        .with_learning_rate(0.1)
        .with_num_workers(1)
}

/// Writes `per_class` PNGs for each of the ten digits. Every image carries
/// its digit as a flat intensity, plus a unique top-left pixel so individual
/// samples stay traceable through the split.
fn write_digit_tree(root: &Path, per_class: usize) {
    for digit in 0..NUM_CLASSES {
        let dir = root.join(digit.to_string());
        std::fs::create_dir_all(&dir).unwrap();
        for i in 0..per_class {
            let mut img =
                GrayImage::from_pixel(WIDTH as u32, HEIGHT as u32, Luma([(digit * 20) as u8]));
            img.put_pixel(0, 0, Luma([(digit * per_class + i) as u8]));
            img.save(dir.join(format!("img_{i}.png"))).unwrap();
        }
    }
}

#[test]
fn loader_aligns_samples_with_labels() {
    let dir = TempDir::new().unwrap();
    write_digit_tree(dir.path(), 3);

    let (images, labels) = load_digit_tree(dir.path()).unwrap();
    assert_eq!(images.len(), 30);
    assert_eq!(labels.len(), 30);

    for (image, label) in images.iter().zip(&labels) {
        assert_eq!(image.pixels.len(), HEIGHT * WIDTH);
        let digit: usize = label.parse().unwrap();
        // pixel 1 is untouched by the id marker at pixel 0
        let expected = (digit * 20) as f32 / 255.0;
        assert!((image.pixels[1] - expected).abs() < 1e-6);
    }
}

#[test]
fn loader_fails_fast_on_undecodable_files() {
    let dir = TempDir::new().unwrap();
    let class = dir.path().join("3");
    std::fs::create_dir_all(&class).unwrap();
    std::fs::write(class.join("junk.png"), b"not an image").unwrap();

    let err = load_digit_tree(dir.path()).unwrap_err();
    assert!(matches!(err, PipelineError::Decode { .. }));
}

#[test]
fn loader_rejects_an_empty_tree() {
    let dir = TempDir::new().unwrap();
    let err = load_digit_tree(dir.path()).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyDataset(_)));
}

#[test]
fn seeded_split_yields_70_30_with_every_digit_in_both_partitions() {
    let dir = TempDir::new().unwrap();
    write_digit_tree(dir.path(), 10);

    let (images, labels) = load_digit_tree(dir.path()).unwrap();
    assert_eq!(images.len(), 100);

    let split = assemble(images, labels, &test_config()).unwrap();
    assert_eq!(split.train.len(), 70);
    assert_eq!(split.test.len(), 30);

    let digits = |set: &dyn Dataset<burn_digits::dataset::DigitItem>| -> HashSet<usize> {
        (0..set.len())
            .map(|i| set.get(i).unwrap().class_index())
            .collect()
    };
    assert_eq!(digits(&split.train).len(), NUM_CLASSES);
    assert_eq!(digits(&split.test).len(), NUM_CLASSES);
}

#[test]
fn training_learns_a_separable_dataset() {
    let dir = TempDir::new().unwrap();
    // two classes only: all-black zeros and all-white ones
    for (digit, value) in [(0u8, 0u8), (1, 255)] {
        let class = dir.path().join(digit.to_string());
        std::fs::create_dir_all(&class).unwrap();
        for i in 0..20 {
            GrayImage::from_pixel(WIDTH as u32, HEIGHT as u32, Luma([value]))
                .save(class.join(format!("img_{i}.png")))
                .unwrap();
        }
    }

    let (images, labels) = load_digit_tree(dir.path()).unwrap();
    let config = test_config();
    let split = assemble(images, labels, &config).unwrap();

    let device = <TestBackend as Backend>::Device::default();
    let model = config.model.init::<TestAutoBackend>(&device);
    let (model, _) = training::train(model, split.train, &config);
    let metrics = training::evaluate(&model.valid(), split.test, &config);

    assert!(
        metrics.accuracy > 90.0,
        "accuracy {:.2}% should exceed 90%",
        metrics.accuracy
    );
}

#[test]
fn saved_artifact_reproduces_predictions() {
    let dir = TempDir::new().unwrap();
    write_digit_tree(dir.path(), 2);

    let (images, labels) = load_digit_tree(dir.path()).unwrap();
    let config = test_config().with_epochs(1);
    let split = assemble(images, labels, &config).unwrap();

    let device = <TestBackend as Backend>::Device::default();
    let model = config.model.init::<TestAutoBackend>(&device);
    let (model, _) = training::train(model, split.train, &config);
    let model = model.valid();

    let artifacts = TempDir::new().unwrap();
    persist::save(model.clone(), &config.model, artifacts.path(), "mnisttag").unwrap();
    let reloaded = persist::load::<TestBackend>(artifacts.path(), "mnisttag", &device).unwrap();

    let items: Vec<_> = (0..split.test.len())
        .map(|i| split.test.get(i).unwrap())
        .collect();
    let batch: DigitBatch<TestBackend> = DigitBatcher::default().batch(items, &device);

    let before = model
        .predict(batch.images.clone())
        .into_data()
        .to_vec::<f32>()
        .unwrap();
    let after = reloaded
        .predict(batch.images)
        .into_data()
        .to_vec::<f32>()
        .unwrap();

    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(&after) {
        assert!((a - b).abs() < 1e-5);
    }
}
