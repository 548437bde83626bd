//! Validated optimization parameters.
//!
//! Both parameter types can only be constructed through validation, so an
//! out-of-range value is unrepresentable once a job exists.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validate::ValidationError;

/// Target image resolution for downsampling.
///
/// Only the enumerated resolutions are accepted; anything else is rejected
/// at intake, never clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dpi {
    /// 96 dots per inch.
    Dpi96,
    /// 120 dots per inch.
    Dpi120,
    /// 150 dots per inch (default).
    #[default]
    Dpi150,
}

impl Dpi {
    /// The numeric resolution value.
    pub const fn value(self) -> u32 {
        match self {
            Self::Dpi96 => 96,
            Self::Dpi120 => 120,
            Self::Dpi150 => 150,
        }
    }
}

impl TryFrom<u32> for Dpi {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            96 => Ok(Self::Dpi96),
            120 => Ok(Self::Dpi120),
            150 => Ok(Self::Dpi150),
            other => Err(ValidationError::UnsupportedDpi {
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for Dpi {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::UnsupportedDpi {
                value: s.to_string(),
            })?;
        Self::try_from(value)
    }
}

impl Serialize for Dpi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.value())
    }
}

impl<'de> Deserialize<'de> for Dpi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u32::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// JPEG quality used when re-encoding images.
///
/// Valid values are the inclusive range 40..=85.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JpegQuality(u8);

impl JpegQuality {
    /// Lowest accepted quality.
    pub const MIN: u8 = 40;
    /// Highest accepted quality.
    pub const MAX: u8 = 85;

    /// The numeric quality value.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for JpegQuality {
    fn default() -> Self {
        Self(70)
    }
}

impl TryFrom<u32> for JpegQuality {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (Self::MIN as u32..=Self::MAX as u32).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::InvalidJpegQuality {
                value: value.to_string(),
            })
        }
    }
}

impl FromStr for JpegQuality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidJpegQuality {
                value: s.to_string(),
            })?;
        Self::try_from(value)
    }
}

impl Serialize for JpegQuality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for JpegQuality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u32::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// The immutable parameter set of an optimization job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeParams {
    /// Target image resolution.
    pub dpi: Dpi,
    /// JPEG re-encoding quality.
    pub jpegq: JpegQuality,
}
