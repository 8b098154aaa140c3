//! Run configuration and component factories
//!
//! `TrainConfig` is the immutable parameter set for one training run,
//! supplied once at driver construction. The `make_*` factories turn it into
//! the criterion, update strategy and schedule the epoch loops consume.

use crate::error::{Error, Result};
use crate::optim::{Adam, Lbfgs, Sgd, StepDecayLr, Strategy};
use crate::train::{BceLoss, Criterion, MseLoss};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Parameter-update rule families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    /// SGD with momentum (first-order)
    Sgd,
    /// Adam (first-order)
    Adam,
    /// L-BFGS (line-search family, closure-driven)
    Lbfgs,
}

impl OptimizerKind {
    /// Whether this kind belongs to the line-search family
    pub fn is_line_search(&self) -> bool {
        matches!(self, OptimizerKind::Lbfgs)
    }
}

impl FromStr for OptimizerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sgd" => Ok(OptimizerKind::Sgd),
            "adam" => Ok(OptimizerKind::Adam),
            "lbfgs" => Ok(OptimizerKind::Lbfgs),
            other => Err(Error::Config(format!("unknown optimizer: {other}"))),
        }
    }
}

/// Reconstruction criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossKind {
    /// Mean squared error
    Mse,
    /// Binary cross-entropy
    Bce,
}

/// Immutable run parameters
///
/// Built once, read-only thereafter. Defaults are serde-backed so YAML
/// configurations can stay sparse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Device identifier (`cpu`, `cuda`, `cuda:<n>`)
    pub device: String,
    /// Number of epochs
    pub epochs: usize,
    /// Optimizer kind
    pub optimizer: OptimizerKind,
    /// Reconstruction criterion
    pub loss: LossKind,
    /// Learning rate (initial step length for L-BFGS)
    pub lr: f32,
    /// SGD momentum
    pub momentum: f32,
    /// Weight decay coefficient
    pub weight_decay: f32,
    /// Random seed
    pub seed: u64,
    /// Decoder checkpoint directory
    pub save_path: PathBuf,
    /// Encoder checkpoint directory; `None` disables encoder checkpoints
    pub encoder_save_path: Option<PathBuf>,
    /// Whether decoder checkpoints are written at all
    pub save_decoder: bool,
    /// Write a decoder checkpoint every N epochs (must be ≥ 1)
    pub checkpoint_interval: usize,
    /// Scheduler: decay the learning rate by `lr_decay` every `lr_decay_epochs`
    pub lr_decay_epochs: usize,
    /// Scheduler decay factor
    pub lr_decay: f32,
    /// Number of samples in the fixed visualization subset
    pub viz_samples: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            device: "cpu".to_string(),
            epochs: 10,
            optimizer: OptimizerKind::Sgd,
            loss: LossKind::Mse,
            lr: 0.01,
            momentum: 0.9,
            weight_decay: 0.0,
            seed: 42,
            save_path: PathBuf::from("checkpoints"),
            encoder_save_path: None,
            save_decoder: true,
            checkpoint_interval: 1,
            lr_decay_epochs: 30,
            lr_decay: 0.1,
            viz_samples: 8,
        }
    }
}

impl TrainConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the epoch count
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the optimizer kind
    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Set the learning rate
    pub fn with_lr(mut self, lr: f32) -> Self {
        self.lr = lr;
        self
    }

    /// Set the weight decay coefficient
    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the decoder checkpoint directory
    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = path.into();
        self
    }

    /// Set the encoder checkpoint directory
    pub fn with_encoder_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.encoder_save_path = Some(path.into());
        self
    }

    /// Set the decoder checkpoint interval
    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Load a config from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let config: TrainConfig = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse YAML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.checkpoint_interval == 0 {
            return Err(Error::Config(
                "checkpoint_interval must be at least 1".to_string(),
            ));
        }
        if !self.lr.is_finite() || self.lr <= 0.0 {
            return Err(Error::Config(format!("invalid learning rate: {}", self.lr)));
        }
        Ok(())
    }
}

/// Build the reconstruction criterion from the configuration
pub fn make_criterion(config: &TrainConfig) -> Box<dyn Criterion> {
    match config.loss {
        LossKind::Mse => Box::new(MseLoss),
        LossKind::Bce => Box::new(BceLoss),
    }
}

/// Build the update strategy (optimizer, plus scheduler for first-order kinds)
pub fn make_strategy(config: &TrainConfig) -> Result<Strategy> {
    config.validate()?;
    match config.optimizer {
        OptimizerKind::Sgd => Ok(Strategy::FirstOrder {
            optimizer: Box::new(Sgd::new(config.lr, config.momentum, config.weight_decay)),
            scheduler: Box::new(make_scheduler(config)),
        }),
        OptimizerKind::Adam => Ok(Strategy::FirstOrder {
            optimizer: Box::new(Adam::default_params(config.lr, config.weight_decay)),
            scheduler: Box::new(make_scheduler(config)),
        }),
        OptimizerKind::Lbfgs => Ok(Strategy::Closure {
            optimizer: Box::new(Lbfgs::default_params(config.lr)),
        }),
    }
}

/// Build the learning-rate schedule from the configuration
pub fn make_scheduler(config: &TrainConfig) -> StepDecayLr {
    StepDecayLr::new(config.lr, config.lr_decay, config.lr_decay_epochs)
}
