//! Reconstruction loss functions

use ndarray::Array1;

/// Trait for reconstruction criteria
///
/// The loss and its gradient with respect to the prediction are computed
/// explicitly; the model seam carries the gradient back through its own
/// parameters. Non-finite results are returned as-is and surfaced by the
/// epoch trainers, never suppressed here.
pub trait Criterion {
    /// Scalar loss between predictions and targets
    fn loss(&self, predictions: &Array1<f32>, targets: &Array1<f32>) -> f32;

    /// Gradient of the loss with respect to the predictions
    fn grad(&self, predictions: &Array1<f32>, targets: &Array1<f32>) -> Array1<f32>;

    /// Name of the criterion
    fn name(&self) -> &str;
}

/// Mean Squared Error
///
/// L = mean((pred - target)²), dL/dpred = 2 (pred - target) / n
pub struct MseLoss;

impl Criterion for MseLoss {
    fn loss(&self, predictions: &Array1<f32>, targets: &Array1<f32>) -> f32 {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );
        let diff = predictions - targets;
        (&diff * &diff).mean().unwrap_or(0.0)
    }

    fn grad(&self, predictions: &Array1<f32>, targets: &Array1<f32>) -> Array1<f32> {
        let n = predictions.len().max(1) as f32;
        (predictions - targets) * (2.0 / n)
    }

    fn name(&self) -> &str {
        "mse"
    }
}

/// Binary Cross-Entropy over per-element probabilities
///
/// Inputs are clamped away from {0, 1} so the log stays finite for
/// well-formed probabilities; genuinely non-finite inputs still produce a
/// non-finite loss that propagates upward.
pub struct BceLoss;

const BCE_EPS: f32 = 1e-7;

impl Criterion for BceLoss {
    fn loss(&self, predictions: &Array1<f32>, targets: &Array1<f32>) -> f32 {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );
        let mut total = 0.0f32;
        for (&p, &t) in predictions.iter().zip(targets.iter()) {
            let p = p.clamp(BCE_EPS, 1.0 - BCE_EPS);
            total += -(t * p.ln() + (1.0 - t) * (1.0 - p).ln());
        }
        total / predictions.len().max(1) as f32
    }

    fn grad(&self, predictions: &Array1<f32>, targets: &Array1<f32>) -> Array1<f32> {
        let n = predictions.len().max(1) as f32;
        Array1::from_iter(predictions.iter().zip(targets.iter()).map(|(&p, &t)| {
            let p = p.clamp(BCE_EPS, 1.0 - BCE_EPS);
            ((p - t) / (p * (1.0 - p))) / n
        }))
    }

    fn name(&self) -> &str {
        "bce"
    }
}
