//! Data source seam

use crate::train::Batch;
use crate::Tensor;

/// A finite, restartable sequence of training batches
///
/// `batches()` yields a fresh pass over the data each call; `sample()` gives
/// index-based access to individual samples for visualization subsetting.
pub trait DataSource {
    /// Number of batches per pass
    fn len(&self) -> usize;

    /// Whether a pass yields no batches
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate one pass over the data
    fn batches(&self) -> Box<dyn Iterator<Item = Batch> + '_>;

    /// Number of individual samples
    fn num_samples(&self) -> usize;

    /// Fetch one sample: (input features, label)
    fn sample(&self, index: usize) -> (Tensor, f32);
}

/// In-memory dataset of fixed-dimension samples
pub struct InMemoryDataset {
    features: Vec<Vec<f32>>,
    labels: Vec<f32>,
    batch_size: usize,
}

impl InMemoryDataset {
    /// Create a dataset from parallel feature/label vectors
    ///
    /// # Panics
    ///
    /// Panics if the vectors differ in length or `batch_size` is zero.
    pub fn new(features: Vec<Vec<f32>>, labels: Vec<f32>, batch_size: usize) -> Self {
        assert_eq!(features.len(), labels.len(), "features/labels length mismatch");
        assert!(batch_size > 0, "batch_size must be positive");
        Self {
            features,
            labels,
            batch_size,
        }
    }

    /// Batch size used by `batches()`
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl DataSource for InMemoryDataset {
    fn len(&self) -> usize {
        self.features.len().div_ceil(self.batch_size)
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Batch> + '_> {
        let iter = self
            .features
            .chunks(self.batch_size)
            .zip(self.labels.chunks(self.batch_size))
            .map(|(feats, labels)| {
                let inputs: Vec<f32> = feats.iter().flatten().copied().collect();
                Batch::new(
                    Tensor::from_vec(inputs, false),
                    Tensor::from_vec(labels.to_vec(), false),
                )
            });
        Box::new(iter)
    }

    fn num_samples(&self) -> usize {
        self.features.len()
    }

    fn sample(&self, index: usize) -> (Tensor, f32) {
        (
            Tensor::from_vec(self.features[index].clone(), false),
            self.labels[index],
        )
    }
}
