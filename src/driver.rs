//! Training driver: the epoch loop and its side effects
//!
//! Owns the `Init -> {Epoch}* -> Done` state machine. Each epoch runs the
//! batch loop (dispatched by optimizer family), then optional visualization,
//! then optional encoder/decoder checkpoints, then a memory diagnostic. A
//! failure anywhere aborts the run; nothing is retried.

use crate::checkpoint::{checkpoint_path, save_state, state_dict};
use crate::config::{make_criterion, make_strategy, TrainConfig};
use crate::data::DataSource;
use crate::device::Device;
use crate::error::Result;
use crate::model::Autoencoder;
use crate::optim::Strategy;
use crate::telemetry::TelemetrySink;
use crate::train::{train_epoch_closure, train_epoch_first_order, EpochReport};
use crate::viz::{sample_indices, Visualizer};
use crate::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;

/// Summary of a completed training run
#[derive(Debug, Default)]
pub struct TrainReport {
    /// Per-epoch summaries, in order
    pub epochs: Vec<EpochReport>,
    /// Decoder checkpoint files written
    pub decoder_checkpoints: Vec<PathBuf>,
    /// Encoder checkpoint files written
    pub encoder_checkpoints: Vec<PathBuf>,
}

impl TrainReport {
    /// Mean loss of the last epoch, if any ran
    pub fn final_loss(&self) -> Option<f32> {
        self.epochs.last().map(|e| e.mean_loss)
    }
}

/// Orchestrates a full training run over an [`Autoencoder`]
///
/// Configuration is immutable after construction. Telemetry and
/// visualization are injected explicitly; absence of either is a no-op.
pub struct TrainingDriver {
    config: TrainConfig,
    device: Device,
    telemetry: Option<Box<dyn TelemetrySink>>,
    visualizer: Option<Box<dyn Visualizer>>,
}

impl TrainingDriver {
    /// Create a driver from a validated configuration
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        let device: Device = config.device.parse()?;
        Ok(Self {
            config,
            device,
            telemetry: None,
            visualizer: None,
        })
    }

    /// Attach a telemetry sink
    pub fn with_telemetry(mut self, sink: Box<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    /// Attach a visualizer
    pub fn with_visualizer(mut self, visualizer: Box<dyn Visualizer>) -> Self {
        self.visualizer = Some(visualizer);
        self
    }

    /// Run the full training loop
    pub fn train(&mut self, model: &dyn Autoencoder, data: &dyn DataSource) -> Result<TrainReport> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let criterion = make_criterion(&self.config);
        let mut strategy = make_strategy(&self.config)?;

        println!("# of model parameters: {}", model.num_parameters());
        println!("--------------------- Training -------------------------------");

        if self.config.save_decoder {
            fs::create_dir_all(&self.config.save_path)?;
        }
        if let Some(encoder_path) = &self.config.encoder_save_path {
            fs::create_dir_all(encoder_path)?;
        }

        // The subset is drawn once so visual drift is comparable across epochs
        let viz_indices = if self.visualizer.is_some() {
            Some(sample_indices(
                &mut rng,
                data.num_samples(),
                self.config.viz_samples,
            ))
        } else {
            None
        };

        let mut report = TrainReport::default();

        for epoch_id in 0..self.config.epochs {
            self.device.empty_cache();

            let epoch_report = match &mut strategy {
                Strategy::Closure { optimizer } => train_epoch_closure(
                    &self.config,
                    model,
                    data,
                    epoch_id,
                    self.device,
                    criterion.as_ref(),
                    optimizer.as_mut(),
                    self.telemetry.as_deref_mut(),
                )?,
                Strategy::FirstOrder { optimizer, scheduler } => train_epoch_first_order(
                    &self.config,
                    model,
                    data,
                    epoch_id,
                    self.device,
                    criterion.as_ref(),
                    optimizer.as_mut(),
                    scheduler.as_mut(),
                    self.telemetry.as_deref_mut(),
                )?,
            };
            report.epochs.push(epoch_report);

            if let (Some(visualizer), Some(indices)) =
                (self.visualizer.as_mut(), viz_indices.as_ref())
            {
                let mut originals = Vec::with_capacity(indices.len());
                let mut labels = Vec::with_capacity(indices.len());
                for &index in indices {
                    let (input, label) = data.sample(index);
                    originals.push(input.to(self.device));
                    labels.push(label);
                }

                model.set_eval();
                let reconstructions: Vec<Tensor> = originals
                    .iter()
                    .map(|input| model.forward(input).output)
                    .collect();
                visualizer.render(&originals, &reconstructions, &labels)?;
            }

            if let Some(encoder_path) = &self.config.encoder_save_path {
                let path = checkpoint_path(encoder_path, epoch_id + 1);
                save_state(&state_dict(&model.encoder_state()), &path)?;
                report.encoder_checkpoints.push(path);
            }

            if self.config.save_decoder && (epoch_id + 1) % self.config.checkpoint_interval == 0 {
                let path = checkpoint_path(&self.config.save_path, epoch_id + 1);
                save_state(&state_dict(&model.decoder_state()), &path)?;
                report.decoder_checkpoints.push(path);
            }

            println!(
                "Memory reserved on {}: {}",
                self.device,
                self.device.memory_reserved()
            );
        }

        Ok(report)
    }
}
