//! Reconstruction visualization seam

use crate::error::Result;
use crate::Tensor;
use rand::rngs::StdRng;

/// External renderer for original/reconstruction pairs
///
/// Invoked once per epoch, after the batch loop, with the same fixed sample
/// subset every time so visual drift is comparable across epochs.
pub trait Visualizer {
    /// Render originals against their reconstructions
    fn render(
        &mut self,
        originals: &[Tensor],
        reconstructions: &[Tensor],
        labels: &[f32],
    ) -> Result<()>;
}

/// Draw a fixed subset of sample indices, without replacement
///
/// Called once before the epoch loop; the result is reused for every epoch
/// of the run.
pub fn sample_indices(rng: &mut StdRng, num_samples: usize, count: usize) -> Vec<usize> {
    let count = count.min(num_samples);
    rand::seq::index::sample(rng, num_samples, count).into_vec()
}
