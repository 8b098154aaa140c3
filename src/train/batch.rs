//! Batch data structure

use crate::Tensor;

/// A training batch containing inputs and targets
///
/// `inputs` holds the flattened sample features for the whole batch; `targets`
/// holds one label per sample, so the batch size equals `targets.len()`.
/// Batches are transient: owned by the current iteration, discarded after.
#[derive(Clone)]
pub struct Batch {
    /// Input features (flattened across samples)
    pub inputs: Tensor,
    /// Target labels, one per sample
    pub targets: Tensor,
}

impl Batch {
    /// Create a new batch
    pub fn new(inputs: Tensor, targets: Tensor) -> Self {
        Self { inputs, targets }
    }

    /// Number of samples in the batch
    pub fn size(&self) -> usize {
        self.targets.len()
    }
}
