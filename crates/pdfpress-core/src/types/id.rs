//! Typed job identifier.
//!
//! Job ids double as the only key from which per-job filesystem paths are
//! derived, so their format is a security invariant: parsing is strict and
//! is the sole way to obtain a [`JobId`] from untrusted input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;

/// Canonical length of a job id string.
pub const JOB_ID_LEN: usize = 32;

/// Error returned when a string is not a canonical job id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid job id: expected exactly 32 lowercase hex characters")]
pub struct InvalidJobId;

impl From<InvalidJobId> for AppError {
    fn from(err: InvalidJobId) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Unique identifier for an optimization job.
///
/// The canonical text form is exactly 32 lowercase hexadecimal characters
/// (a UUIDv4 rendered without hyphens). [`FromStr`] is the only fallible
/// constructor and rejects anything else, which guarantees that a parsed
/// id can never smuggle path separators or escape the storage root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_simple())
    }
}

impl FromStr for JobId {
    type Err = InvalidJobId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != JOB_ID_LEN {
            return Err(InvalidJobId);
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(InvalidJobId);
        }
        // The charset check above restricts the input to the simple form,
        // so this parse can only fail on an invalid UUID encoding.
        Uuid::try_parse(s).map(Self).map_err(|_| InvalidJobId)
    }
}

impl Serialize for JobId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
