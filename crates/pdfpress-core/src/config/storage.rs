//! Artifact storage configuration.

use serde::{Deserialize, Serialize};

/// Artifact storage configuration.
///
/// Uploads, outputs, and in-flight temporary files all live under the
/// single `root` directory so output publication can use a same-volume
/// rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all artifacts.
    #[serde(default = "default_root")]
    pub root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> String {
    "./data".to_string()
}
