//! Autoencoder training loops
//!
//! This crate is the glue between a model and its training run: it iterates
//! epochs, feeds batches through an [`Autoencoder`](model::Autoencoder),
//! computes a reconstruction loss, steps an optimizer (and scheduler, for
//! first-order kinds), logs metrics, periodically checkpoints sub-module
//! weights and optionally visualizes reconstructions. The heavy numerics —
//! the architecture, gradient computation, dataset construction, rendering —
//! sit behind trait seams.
//!
//! Two epoch-training control flows are supported and selected by optimizer
//! kind: a first-order loop performing one parameter update per batch, and a
//! closure-based loop for line-search optimizers (L-BFGS) that may evaluate
//! the loss several times per step.
//!
//! # Example
//!
//! ```no_run
//! use reconstruir::config::{OptimizerKind, TrainConfig};
//! use reconstruir::data::InMemoryDataset;
//! use reconstruir::driver::TrainingDriver;
//! use reconstruir::model::LinearAutoencoder;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! # fn main() -> reconstruir::Result<()> {
//! let config = TrainConfig::new()
//!     .with_epochs(20)
//!     .with_optimizer(OptimizerKind::Adam)
//!     .with_lr(0.001)
//!     .with_save_path("checkpoints/decoder");
//!
//! let mut rng = StdRng::seed_from_u64(config.seed);
//! let model = LinearAutoencoder::new(8, 3, &mut rng);
//! let data = InMemoryDataset::new(vec![vec![0.0; 8]; 64], vec![0.0; 64], 16);
//!
//! let report = TrainingDriver::new(config)?.train(&model, &data)?;
//! println!("final loss: {:?}", report.final_loss());
//! # Ok(())
//! # }
//! ```

pub mod checkpoint;
pub mod config;
pub mod data;
pub mod device;
pub mod driver;
pub mod error;
pub mod model;
pub mod optim;
pub mod telemetry;
mod tensor;
pub mod train;
pub mod viz;

pub use error::{Error, Result};
pub use tensor::Tensor;
