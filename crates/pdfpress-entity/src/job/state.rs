//! Job state machine.
//!
//! The lifecycle is strictly monotonic: `queued → processing → done | failed`.
//! `done` and `failed` are terminal. Status-dependent data (the published
//! output path, the failure message) lives inside the corresponding
//! [`JobState`] variant instead of ad-hoc optional fields, so a job in the
//! wrong state simply has nowhere to carry it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current state of an optimization job, including variant payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    /// Waiting in the queue for a worker.
    Queued,
    /// Claimed by a worker and currently being optimized.
    Processing,
    /// Optimization finished and the output artifact is published.
    Done {
        /// Storage-relative path of the published artifact.
        output_path: String,
    },
    /// Optimization failed.
    Failed {
        /// Human-readable failure diagnostic.
        error: String,
    },
}

impl JobState {
    /// The fieldless status tag for this state.
    pub fn status(&self) -> JobStatus {
        match self {
            Self::Queued => JobStatus::Queued,
            Self::Processing => JobStatus::Processing,
            Self::Done { .. } => JobStatus::Done,
            Self::Failed { .. } => JobStatus::Failed,
        }
    }

    /// The published output path, if this state carries one.
    pub fn output_path(&self) -> Option<&str> {
        match self {
            Self::Done { output_path } => Some(output_path),
            _ => None,
        }
    }

    /// The failure diagnostic, if this state carries one.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Status tag of a job, without variant payloads.
///
/// Used wherever only the tag matters, most importantly as the expected
/// value in guarded store transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting to be picked up by a worker.
    Queued,
    /// Currently being processed by a worker.
    Processing,
    /// Successfully completed.
    Done,
    /// Failed permanently.
    Failed,
}

impl JobStatus {
    /// Check if the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Parse a lowercase status string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "processing" => Some(Self::Processing),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
