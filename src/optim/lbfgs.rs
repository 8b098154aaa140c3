//! L-BFGS optimizer with backtracking line search
//!
//! Limited-memory BFGS over flattened parameters. Each [`step`] call may
//! evaluate the supplied loss closure several times: once to obtain the loss
//! and gradients at the current point, then once per trial point of the
//! Armijo backtracking line search.
//!
//! [`step`]: crate::optim::ClosureOptimizer::step

use super::ClosureOptimizer;
use crate::Tensor;
use ndarray::Array1;
use std::collections::VecDeque;

/// L-BFGS optimizer
pub struct Lbfgs {
    lr: f32,
    history_size: usize,
    max_line_search: usize,
    armijo_c1: f32,
    s_history: VecDeque<Array1<f32>>,
    y_history: VecDeque<Array1<f32>>,
    prev_point: Option<Array1<f32>>,
    prev_grad: Option<Array1<f32>>,
}

impl Lbfgs {
    /// Create a new L-BFGS optimizer
    ///
    /// `lr` is the initial step length handed to the line search.
    pub fn new(lr: f32, history_size: usize, max_line_search: usize) -> Self {
        Self {
            lr,
            history_size: history_size.max(1),
            max_line_search: max_line_search.max(1),
            armijo_c1: 1e-4,
            s_history: VecDeque::new(),
            y_history: VecDeque::new(),
            prev_point: None,
            prev_grad: None,
        }
    }

    /// Create L-BFGS with a typical configuration
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 10, 20)
    }

    /// Flatten parameter values and gradients into single vectors
    ///
    /// Parameters without an accumulated gradient contribute zeros.
    fn gather(params: &[Tensor]) -> (Array1<f32>, Array1<f32>) {
        let total: usize = params.iter().map(Tensor::len).sum();
        let mut point = Vec::with_capacity(total);
        let mut grad = Vec::with_capacity(total);
        for param in params {
            point.extend(param.to_vec());
            match param.grad() {
                Some(g) => grad.extend(g.iter().copied()),
                None => grad.extend(std::iter::repeat(0.0).take(param.len())),
            }
        }
        (Array1::from_vec(point), Array1::from_vec(grad))
    }

    /// Write a flat vector back into the parameter tensors
    fn scatter(params: &mut [Tensor], flat: &Array1<f32>) {
        let mut offset = 0;
        for param in params {
            let len = param.len();
            let mut data = param.data_mut();
            for (i, value) in flat.slice(ndarray::s![offset..offset + len]).iter().enumerate() {
                data[i] = *value;
            }
            offset += len;
        }
    }

    /// Search direction from the two-loop recursion over (s, y) history
    fn direction(&self, grad: &Array1<f32>) -> Array1<f32> {
        if self.s_history.is_empty() {
            return grad * -1.0;
        }

        let mut q = grad.clone();
        let k = self.s_history.len();
        let mut alphas = vec![0.0f32; k];
        let mut rhos = vec![0.0f32; k];

        for i in (0..k).rev() {
            let s = &self.s_history[i];
            let y = &self.y_history[i];
            rhos[i] = 1.0 / y.dot(s);
            alphas[i] = rhos[i] * s.dot(&q);
            q = q - y * alphas[i];
        }

        // Initial Hessian scaling: gamma = sᵀy / yᵀy for the newest pair
        let s_last = &self.s_history[k - 1];
        let y_last = &self.y_history[k - 1];
        let gamma = s_last.dot(y_last) / y_last.dot(y_last);
        let mut r = q * gamma;

        for i in 0..k {
            let s = &self.s_history[i];
            let y = &self.y_history[i];
            let beta = rhos[i] * y.dot(&r);
            r = r + s * (alphas[i] - beta);
        }

        r * -1.0
    }

    fn push_history(&mut self, s: Array1<f32>, y: Array1<f32>) {
        // Skip pairs with a non-positive curvature estimate
        if s.dot(&y) <= 1e-10 {
            return;
        }
        self.s_history.push_back(s);
        self.y_history.push_back(y);
        while self.s_history.len() > self.history_size {
            self.s_history.pop_front();
            self.y_history.pop_front();
        }
    }
}

impl ClosureOptimizer for Lbfgs {
    fn step(&mut self, params: &mut [Tensor], closure: &mut dyn FnMut() -> f32) -> f32 {
        let loss0 = closure();
        let (x0, g0) = Self::gather(params);

        if x0.is_empty() {
            return loss0;
        }

        if let (Some(px), Some(pg)) = (self.prev_point.take(), self.prev_grad.take()) {
            if px.len() == x0.len() {
                self.push_history(&x0 - &px, &g0 - &pg);
            }
        }

        let mut d = self.direction(&g0);
        let mut dir_deriv = g0.dot(&d);
        if dir_deriv >= 0.0 {
            // History produced a non-descent direction; fall back to steepest descent
            d = &g0 * -1.0;
            dir_deriv = -g0.dot(&g0);
        }

        // Backtracking Armijo line search; each trial re-evaluates the closure
        let mut t = self.lr;
        let mut final_loss = loss0;
        for _ in 0..self.max_line_search {
            let trial = &x0 + &(&d * t);
            Self::scatter(params, &trial);
            let loss = closure();
            final_loss = loss;
            if loss <= loss0 + self.armijo_c1 * t * dir_deriv {
                break;
            }
            t *= 0.5;
        }

        let (x1, g1) = Self::gather(params);
        self.prev_point = Some(x1);
        self.prev_grad = Some(g1);

        final_loss
    }

    fn lr(&self) -> f32 {
        self.lr
    }
}
