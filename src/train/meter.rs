//! Running loss accumulation

/// Running mean of a scalar weighted by batch size
///
/// One meter is live per epoch: constructed at epoch start, read once at
/// epoch end, never persisted.
#[derive(Debug, Default)]
pub struct AverageMeter {
    sum: f64,
    count: usize,
}

impl AverageMeter {
    /// Create an empty meter
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` with weight `n` (the batch size)
    pub fn update(&mut self, value: f32, n: usize) {
        self.sum += f64::from(value) * n as f64;
        self.count += n;
    }

    /// Weighted mean of everything recorded so far
    ///
    /// An empty meter reports `0.0` rather than dividing by zero, so an
    /// epoch over an empty data source still produces a defined summary.
    pub fn avg(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum / self.count as f64) as f32
        }
    }

    /// Total weight recorded
    pub fn count(&self) -> usize {
        self.count
    }

    /// Discard all recorded values
    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }
}
