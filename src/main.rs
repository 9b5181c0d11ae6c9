use std::path::PathBuf;

use burn::config::Config;
use burn::module::AutodiffModule;

use burn_digits::backend::{MainAutoBackend, main_device};
use burn_digits::config::PipelineConfig;
use burn_digits::dataset::{HEIGHT, WIDTH, assemble, load_digit_tree};
use burn_digits::error::{PipelineError, Result};
use burn_digits::model::ConvNetConfig;
use burn_digits::{persist, training};

/// Root of the labeled training images; its subdirectories name the digits.
const TRAIN_DATA_DIR: &str = "data/trainingSet";

/// Companion directory of held-out images.
// TODO: decide whether this should feed an independent hold-out set; the
// test partition currently comes from splitting TRAIN_DATA_DIR.
#[allow(dead_code)]
const TEST_DATA_DIR: &str = "data/testSet";

/// Where the trained artifact lands.
const ARTIFACT_DIR: &str = "mymnist";

/// Lookup key external inference consumers use to find the artifact.
const ARTIFACT_TAG: &str = "mnisttag";

const HELP: &str = "\
burn-digits

Trains a convolutional digit classifier from a labeled image directory,
evaluates it on a held-out partition, and exports the trained model.

USAGE:
    burn-digits [OPTIONS]

FLAGS:
    -h, --help                 Show this help message and exit

OPTIONS:
    -d, --data-path <PATH>     Labeled image directory (default: data/trainingSet)
    -a, --artifacts-path <PATH>
                               Output directory for the trained artifact (default: mymnist)
    -t, --tag <NAME>           Artifact tag used by inference consumers (default: mnisttag)
    -c, --config <PATH>        Load the pipeline configuration from this JSON file
";

#[derive(Debug)]
struct AppArgs {
    data_path: PathBuf,
    artifacts_path: PathBuf,
    tag: String,
    config: Option<PathBuf>,
}

impl AppArgs {
    fn parse() -> std::result::Result<Self, pico_args::Error> {
        let mut pargs = pico_args::Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            println!("{HELP}");
            std::process::exit(0);
        }

        let args = AppArgs {
            data_path: pargs
                .opt_value_from_os_str(["-d", "--data-path"], parse_path)?
                .unwrap_or_else(|| TRAIN_DATA_DIR.into()),
            artifacts_path: pargs
                .opt_value_from_os_str(["-a", "--artifacts-path"], parse_path)?
                .unwrap_or_else(|| ARTIFACT_DIR.into()),
            tag: pargs
                .opt_value_from_str(["-t", "--tag"])?
                .unwrap_or_else(|| ARTIFACT_TAG.to_owned()),
            config: pargs.opt_value_from_os_str(["-c", "--config"], parse_path)?,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            panic!("unused arguments: {remaining:?}");
        }

        Ok(args)
    }
}

fn parse_path(s: &std::ffi::OsStr) -> std::result::Result<PathBuf, &'static str> {
    Ok(s.into())
}

fn main() {
    let args = match AppArgs::parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("argument error: {err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: AppArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            PipelineConfig::load(path).map_err(|source| PipelineError::Config {
                path: path.clone(),
                source,
            })?
        }
        None => PipelineConfig::new(ConvNetConfig::new()),
    };
    let device = main_device();

    let (images, labels) = load_digit_tree(&args.data_path)?;
    println!("loaded {} samples from {:?}", images.len(), args.data_path);

    let split = assemble(images, labels, &config)?;
    println!("input sample shape: [1, {HEIGHT}, {WIDTH}]");

    let model = config.model.init::<MainAutoBackend>(&device);
    let (model, train_metrics) = training::train(model, split.train, &config);
    println!(
        "final train loss: {:.4}, accuracy: {:.2}%",
        train_metrics.loss, train_metrics.accuracy
    );

    let model = model.valid();
    let metrics = training::evaluate(&model, split.test, &config);

    let artifact = persist::save(model, &config.model, &args.artifacts_path, &args.tag)?;
    println!("saved trained model to {artifact:?}");

    println!("Test loss: {:.4}", metrics.loss);
    println!("Test accuracy: {:.2}%", metrics.accuracy);

    Ok(())
}
