//! External optimization tool configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the external PDF optimization tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Name or path of the Ghostscript binary.
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Maximum wall-clock seconds a single invocation may take.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_binary() -> String {
    "gs".to_string()
}

fn default_timeout() -> u64 {
    3600
}
