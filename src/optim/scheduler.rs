//! Learning rate schedulers

use super::Optimizer;
use std::f32::consts::PI;

/// Learning rate scheduler trait
///
/// Stepped once per epoch by the first-order trainer; the closure-based
/// trainer does not use one.
pub trait LRScheduler {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Advance the schedule by one step
    fn step(&mut self);

    /// Apply the current learning rate to an optimizer
    fn apply(&self, optimizer: &mut dyn Optimizer) {
        optimizer.set_lr(self.get_lr());
    }
}

/// Step decay: multiply the learning rate by `gamma` every `step_size` steps
///
/// lr_t = lr_0 * gamma^(t / step_size)
pub struct StepDecayLr {
    base_lr: f32,
    gamma: f32,
    step_size: usize,
    current_step: usize,
}

impl StepDecayLr {
    /// Create a new step decay scheduler
    pub fn new(base_lr: f32, gamma: f32, step_size: usize) -> Self {
        Self {
            base_lr,
            gamma,
            step_size: step_size.max(1),
            current_step: 0,
        }
    }
}

impl LRScheduler for StepDecayLr {
    fn get_lr(&self) -> f32 {
        let decays = (self.current_step / self.step_size) as i32;
        self.base_lr * self.gamma.powi(decays)
    }

    fn step(&mut self) {
        self.current_step += 1;
    }
}

/// Cosine annealing from `lr_max` down to `lr_min` over `t_max` steps
///
/// lr_t = lr_min + 0.5 * (lr_max - lr_min) * (1 + cos(π * t / T))
pub struct CosineAnnealingLr {
    lr_max: f32,
    lr_min: f32,
    t_max: usize,
    current_step: usize,
}

impl CosineAnnealingLr {
    /// Create a new cosine annealing scheduler
    pub fn new(lr_max: f32, t_max: usize, lr_min: f32) -> Self {
        Self {
            lr_max,
            lr_min,
            t_max: t_max.max(1),
            current_step: 0,
        }
    }
}

impl LRScheduler for CosineAnnealingLr {
    fn get_lr(&self) -> f32 {
        if self.current_step >= self.t_max {
            return self.lr_min;
        }
        let progress = self.current_step as f32 / self.t_max as f32;
        let cosine_decay = 0.5 * (1.0 + (PI * progress).cos());
        self.lr_min + (self.lr_max - self.lr_min) * cosine_decay
    }

    fn step(&mut self) {
        self.current_step += 1;
    }
}
