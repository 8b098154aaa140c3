//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// SGD with optional momentum and L2 weight decay
pub struct Sgd {
    lr: f32,
    momentum: f32,
    weight_decay: f32,
    velocities: Vec<Option<Array1<f32>>>,
}

impl Sgd {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32, weight_decay: f32) -> Self {
        Self {
            lr,
            momentum,
            weight_decay,
            velocities: Vec::new(),
        }
    }

    /// Initialize velocities if needed
    fn ensure_velocities(&mut self, params: &[Tensor]) {
        if self.velocities.is_empty() {
            self.velocities = params.iter().map(|_| None).collect();
        }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [Tensor]) {
        self.ensure_velocities(params);

        for (i, param) in params.iter_mut().enumerate() {
            let Some(mut grad) = param.grad() else {
                continue;
            };

            if self.weight_decay > 0.0 {
                let decay = {
                    let data = param.data();
                    &*data * self.weight_decay
                };
                grad = grad + decay;
            }

            if self.momentum > 0.0 {
                // v = momentum * v - lr * grad
                let velocity = if let Some(v) = &self.velocities[i] {
                    v * self.momentum - &grad * self.lr
                } else {
                    &grad * (-self.lr)
                };

                let new = {
                    let data = param.data();
                    &*data + &velocity
                };
                *param.data_mut() = new;
                self.velocities[i] = Some(velocity);
            } else {
                // param -= lr * grad
                let new = {
                    let data = param.data();
                    &*data - &(&grad * self.lr)
                };
                *param.data_mut() = new;
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}
