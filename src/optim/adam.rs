//! Adam optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// Adam optimizer with bias-corrected moment estimates
///
/// Weight decay is folded into the gradient (classic L2 regularization):
/// g_t = ∇L + λ * θ_{t-1}
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>, // First moment
    v: Vec<Option<Array1<f32>>>, // Second moment
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32, weight_decay: f32) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            epsilon,
            weight_decay,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Create Adam with default betas and epsilon
    pub fn default_params(lr: f32, weight_decay: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8, weight_decay)
    }

    /// Initialize moments if needed
    fn ensure_moments(&mut self, params: &[Tensor]) {
        if self.m.is_empty() {
            self.m = params.iter().map(|_| None).collect();
            self.v = params.iter().map(|_| None).collect();
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [Tensor]) {
        self.ensure_moments(params);
        self.t += 1;

        let bias1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias2 = 1.0 - self.beta2.powi(self.t as i32);

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

            let m = self.m[i].get_or_insert_with(|| Array1::zeros(grad.len()));
            let v = self.v[i].get_or_insert_with(|| Array1::zeros(grad.len()));

            *m = &*m * self.beta1 + &grad * (1.0 - self.beta1);
            *v = &*v * self.beta2 + &(&grad * &grad) * (1.0 - self.beta2);

            let m_hat = &*m / bias1;
            let v_hat = &*v / bias2;

            let update =
                Array1::from_iter(m_hat.iter().zip(v_hat.iter()).map(|(&mh, &vh)| {
                    self.lr * mh / (vh.sqrt() + self.epsilon)
                }));

            let new = {
                let data = param.data();
                &*data - &update
            };
            *param.data_mut() = new;
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}
