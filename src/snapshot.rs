//! Host snapshots stored as JSON.
//!
//! A snapshot is a serialized [`Compilation`]: what a host compiler resolved
//! for one pass. Snapshots let a pass be replayed outside the host.

use std::path::{Path, PathBuf};

use thiserror::Error;
use trampoline_core::host::Compilation;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Compilation, SnapshotError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_snapshot(&text)
}

pub fn parse_snapshot(text: &str) -> Result<Compilation, SnapshotError> {
    Ok(serde_json::from_str(text)?)
}
