//! Compute device selection
//!
//! Placement is abstract: tensors accept a [`Device`] but this build computes
//! on the CPU only, so CUDA placements parse and print correctly while cache
//! management and the memory probe are no-ops.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Compute device identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    /// Host CPU
    Cpu,
    /// CUDA device by ordinal
    Cuda(usize),
}

impl Device {
    /// Release cached allocations before an epoch begins
    ///
    /// No-op on CPU.
    pub fn empty_cache(&self) {}

    /// Bytes of memory currently reserved on the device
    ///
    /// Always zero on CPU.
    pub fn memory_reserved(&self) -> usize {
        0
    }
}

impl FromStr for Device {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cpu" => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda(0)),
            other => match other.strip_prefix("cuda:") {
                Some(ordinal) => ordinal
                    .parse::<usize>()
                    .map(Device::Cuda)
                    .map_err(|_| Error::Config(format!("invalid device: {other}"))),
                None => Err(Error::Config(format!("invalid device: {other}"))),
            },
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
        }
    }
}
