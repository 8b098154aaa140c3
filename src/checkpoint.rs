//! Parameter checkpointing
//!
//! Checkpoints are single-shot JSON serializations of a named parameter
//! collection, written to `{root}/epoch_{index:03}.json` with a 1-based
//! epoch index. They are produced here and consumed externally; this crate
//! never reads them back during a run.

use crate::error::{Error, Result};
use crate::Tensor;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Serializable snapshot of a sub-module's parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDict {
    /// Named parameter values, in declaration order
    pub entries: Vec<StateEntry>,
}

/// One named parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEntry {
    /// Parameter name, e.g. `decoder.weight`
    pub name: String,
    /// Flattened values
    pub values: Vec<f32>,
}

/// Snapshot named parameters into a serializable state
pub fn state_dict(params: &[(String, Tensor)]) -> StateDict {
    StateDict {
        entries: params
            .iter()
            .map(|(name, tensor)| StateEntry {
                name: name.clone(),
                values: tensor.to_vec(),
            })
            .collect(),
    }
}

/// Checkpoint path for a 1-based epoch index: `{root}/epoch_{index:03}.json`
pub fn checkpoint_path(root: &Path, epoch: usize) -> PathBuf {
    root.join(format!("epoch_{epoch:03}.json"))
}

/// Write a state snapshot to `path` in one shot
pub fn save_state(state: &StateDict, path: &Path) -> Result<()> {
    let data = serde_json::to_string(state)
        .map_err(|e| Error::Serialization(format!("checkpoint serialization failed: {e}")))?;

    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;

    Ok(())
}
