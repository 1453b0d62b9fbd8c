//! Command line front end: loads (or randomizes) a network, trains it on a
//! dataset file, reports training and testing error, and writes it back out.
//!
//! ```text
//! fnn --serialized-network network.json --training-file training.json \
//!     --testing-file testing.json --serialized-network-out trained.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use fnn::data;
use fnn::prelude::{evaluate, train, ErrorFunction, Format, LearningConfiguration, Network};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train and test a feedforward neural network")]
struct Args {
    /// Serialized network (`.json` for the textual form, binary otherwise)
    #[arg(long)]
    serialized_network: PathBuf,

    /// Training datapoints (`.csv` or a JSON array of {Features, Values})
    #[arg(long)]
    training_file: PathBuf,

    /// Testing datapoints, same format as the training file
    #[arg(long)]
    testing_file: Option<PathBuf>,

    /// JSON learning configuration; overrides the individual flags below
    #[arg(long)]
    learning_config: Option<PathBuf>,

    /// Number of training epochs
    #[arg(long, default_value = "1000")]
    training_iterations: i32,

    /// Gradient step size
    #[arg(long, default_value = "0.001")]
    learning_rate: f64,

    /// Weight decay applied on every update
    #[arg(long, default_value = "0")]
    weight_decay: f64,

    /// Examples per batch, 0 for full batch learning
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    batch_size: i32,

    /// Error function to train against
    #[arg(long, default_value = "QUADRATIC_COST")]
    error_name: String,

    /// Seed for weight initialization and shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the trained network
    #[arg(long)]
    serialized_network_out: Option<PathBuf>,
}

impl Args {
    fn learning_configuration(&self) -> Result<LearningConfiguration> {
        let config = match &self.learning_config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                LearningConfiguration::from_json(&json)?
            }
            None => LearningConfiguration::default()
                .with_epochs(self.training_iterations)
                .with_rate(self.learning_rate)
                .with_decay(self.weight_decay)
                .with_batch_size(self.batch_size)
                .with_error(self.error_name.parse::<ErrorFunction>()?),
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.learning_configuration()?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut network = Network::load(
        &args.serialized_network,
        Format::from_path(&args.serialized_network),
    )
    .with_context(|| format!("loading {}", args.serialized_network.display()))?;
    if network.needs_randomization() {
        network.randomize_synapses(&mut rng);
        info!("randomized unset synapses");
    }
    info!("{}", network.summary());

    let training = data::load(&args.training_file, network.output_width())
        .with_context(|| format!("loading {}", args.training_file.display()))?;
    let testing = match &args.testing_file {
        Some(path) => Some(
            data::load(path, network.output_width())
                .with_context(|| format!("loading {}", path.display()))?,
        ),
        None => None,
    };
    info!(
        training = training.len(),
        testing = testing.as_ref().map_or(0, Vec::len),
        "finished loading data"
    );

    train(&mut network, &training, &config, &mut rng)?;

    info!("Training error: {}", evaluate(&network, &training)?);
    if let Some(testing) = &testing {
        info!("Testing error: {}", evaluate(&network, testing)?);
    }

    if let Some(out) = &args.serialized_network_out {
        network
            .save(out, Format::from_path(out))
            .with_context(|| format!("writing {}", out.display()))?;
        info!("wrote {}", out.display());
    }

    Ok(())
}
