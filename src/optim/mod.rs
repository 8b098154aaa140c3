//! Optimizers and learning rate schedules

mod adam;
mod lbfgs;
mod optimizer;
mod scheduler;
mod sgd;

pub use adam::Adam;
pub use lbfgs::Lbfgs;
pub use optimizer::{ClosureOptimizer, Optimizer};
pub use scheduler::{CosineAnnealingLr, LRScheduler, StepDecayLr};
pub use sgd::Sgd;

/// How an epoch updates parameters: one gradient step per batch, or a
/// line-search step that re-evaluates a loss closure
///
/// One parameterized dispatch point replaces duplicated trainer entry
/// points; the driver matches on this once per epoch.
pub enum Strategy {
    /// Gradient-descent family: one `step` per batch, scheduler advanced
    /// once per epoch
    FirstOrder {
        /// Parameter update rule
        optimizer: Box<dyn Optimizer>,
        /// Learning rate schedule
        scheduler: Box<dyn LRScheduler>,
    },
    /// Line-search family: the optimizer drives a loss closure and may
    /// evaluate it several times per batch
    Closure {
        /// Closure-driven update rule
        optimizer: Box<dyn ClosureOptimizer>,
    },
}

impl Strategy {
    /// Whether this strategy uses the closure-based trainer
    pub fn is_closure(&self) -> bool {
        matches!(self, Strategy::Closure { .. })
    }
}
