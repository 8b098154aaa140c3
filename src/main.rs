//! Reconstruir CLI
//!
//! Single-command training entry point: load a YAML configuration (or start
//! from defaults), apply flag overrides, and train a demo linear autoencoder
//! on synthetic data.
//!
//! ```bash
//! # Train from config
//! reconstruir config.yaml
//!
//! # Train with overrides
//! reconstruir config.yaml --epochs 50 --lr 0.001 --optimizer adam
//! ```

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reconstruir::config::{OptimizerKind, TrainConfig};
use reconstruir::data::InMemoryDataset;
use reconstruir::driver::TrainingDriver;
use reconstruir::model::LinearAutoencoder;
use reconstruir::Result;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "reconstruir", about = "Train an autoencoder from a config")]
struct Cli {
    /// YAML configuration file; defaults apply when omitted
    config: Option<PathBuf>,

    /// Override the number of epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Override the learning rate
    #[arg(long)]
    lr: Option<f32>,

    /// Override the optimizer kind (sgd, adam, lbfgs)
    #[arg(long)]
    optimizer: Option<String>,

    /// Override the decoder checkpoint directory
    #[arg(long)]
    save_path: Option<PathBuf>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => TrainConfig::from_yaml(path)?,
        None => TrainConfig::default(),
    };

    if let Some(epochs) = cli.epochs {
        config.epochs = epochs;
    }
    if let Some(lr) = cli.lr {
        config.lr = lr;
    }
    if let Some(kind) = &cli.optimizer {
        config.optimizer = kind.parse::<OptimizerKind>()?;
    }
    if let Some(path) = cli.save_path {
        config.save_path = path;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;

    // Synthetic demo data: noisy points near a 3-D subspace of an 8-D space
    const IN_DIM: usize = 8;
    const LATENT_DIM: usize = 3;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let features: Vec<Vec<f32>> = (0..256)
        .map(|_| {
            let basis: Vec<f32> = (0..LATENT_DIM).map(|_| rng.gen_range(-1.0..1.0)).collect();
            (0..IN_DIM)
                .map(|i| basis[i % LATENT_DIM] + rng.gen_range(-0.05..0.05))
                .collect()
        })
        .collect();
    let labels: Vec<f32> = (0..features.len()).map(|i| (i % 10) as f32).collect();
    let data = InMemoryDataset::new(features, labels, 32);

    let model = LinearAutoencoder::new(IN_DIM, LATENT_DIM, &mut rng);

    let mut driver = TrainingDriver::new(config)?;
    let report = driver.train(&model, &data)?;

    if let Some(loss) = report.final_loss() {
        println!("\nFinal mean loss: {loss:.6}");
    }
    println!("Decoder checkpoints written: {}", report.decoder_checkpoints.len());

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
