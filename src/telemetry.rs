//! Telemetry sink seam
//!
//! The driver carries an explicit `Option<Box<dyn TelemetrySink>>`; absence
//! is a no-op, never probed from ambient state. Sinks receive one batch of
//! key/value scalars per epoch.

/// Per-epoch scalar log records
pub trait TelemetrySink {
    /// Record scalar values for the given epoch (0-indexed)
    fn log_scalars(&mut self, epoch: usize, scalars: &[(&str, f64)]);
}

/// In-memory sink that records everything, for tests and inspection
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<(usize, Vec<(String, f64)>)>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in emission order
    pub fn records(&self) -> &[(usize, Vec<(String, f64)>)] {
        &self.records
    }

    /// Values recorded under `key`, across epochs
    pub fn metric(&self, key: &str) -> Vec<f64> {
        self.records
            .iter()
            .flat_map(|(_, scalars)| scalars.iter())
            .filter(|(k, _)| k == key)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl TelemetrySink for MemorySink {
    fn log_scalars(&mut self, epoch: usize, scalars: &[(&str, f64)]) {
        self.records.push((
            epoch,
            scalars.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records() {
        let mut sink = MemorySink::new();
        sink.log_scalars(0, &[("losses.avg", 1.5), ("LR", 0.1)]);
        sink.log_scalars(1, &[("losses.avg", 1.2)]);

        assert_eq!(sink.records().len(), 2);
        assert_eq!(sink.metric("losses.avg"), vec![1.5, 1.2]);
        assert_eq!(sink.metric("LR"), vec![0.1]);
        assert!(sink.metric("missing").is_empty());
    }
}
