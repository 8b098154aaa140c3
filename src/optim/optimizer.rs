//! Optimizer traits

use crate::Tensor;

/// Trait for first-order optimization algorithms
///
/// One call to [`step`](Optimizer::step) applies exactly one parameter
/// update from the gradients currently held by `params`.
pub trait Optimizer {
    /// Perform a single optimization step
    fn step(&mut self, params: &mut [Tensor]);

    /// Zero out all gradients
    fn zero_grad(&mut self, params: &mut [Tensor]) {
        for param in params {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);
}

/// Trait for line-search-family optimizers driven by a loss closure
///
/// The closure clears gradients, runs the forward pass, computes the loss,
/// runs the backward pass and returns the loss value. Parameters reach the
/// closure through shared [`Tensor`] handles, so every update the optimizer
/// writes into `params` is visible to the next closure invocation. The
/// optimizer may invoke the closure zero or more times before returning the
/// final loss.
pub trait ClosureOptimizer {
    /// Perform one optimization step, re-evaluating the closure as needed
    fn step(&mut self, params: &mut [Tensor], closure: &mut dyn FnMut() -> f32) -> f32;

    /// Get learning rate (initial step length for the line search)
    fn lr(&self) -> f32;
}
