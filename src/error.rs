//! Error types for FX Motion.
//!
//! The math itself is total; errors only come from degenerate configuration
//! (rejected at construction time) and from loading settings documents.

use std::fmt;

/// Degenerate or inconsistent component configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count that must be at least one was zero.
    ZeroCount(&'static str),
    /// A value that must be finite and strictly positive was not.
    NotPositive { field: &'static str, value: f32 },
    /// A value that must be finite was NaN or infinite.
    NotFinite(&'static str),
    /// Easing window bounds are not `0 <= start < end <= 1`.
    EaseWindow { start: f32, end: f32 },
    /// Seed stride is smaller than the number of scalars drawn per bucket,
    /// so two logically different draws would share a seed.
    StrideAliasing { stride: u32, scalars_per_bucket: u32 },
    /// Population is too large for the reserved seed bands.
    SeedBandOverflow { population: u32, band: u32 },
    /// Restored state does not match the configured topology.
    PointCountMismatch { expected: usize, actual: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCount(field) => write!(f, "{} must be at least 1", field),
            ConfigError::NotPositive { field, value } => {
                write!(f, "{} must be finite and > 0 (got {})", field, value)
            }
            ConfigError::NotFinite(field) => write!(f, "{} must be finite", field),
            ConfigError::EaseWindow { start, end } => write!(
                f,
                "Easing window must satisfy 0 <= start < end <= 1 (got {}..{})",
                start, end
            ),
            ConfigError::StrideAliasing {
                stride,
                scalars_per_bucket,
            } => write!(
                f,
                "Seed stride {} is smaller than the {} scalars drawn per bucket",
                stride, scalars_per_bucket
            ),
            ConfigError::SeedBandOverflow { population, band } => write!(
                f,
                "Population {} exceeds the seed band width {}",
                population, band
            ),
            ConfigError::PointCountMismatch { expected, actual } => write!(
                f,
                "State has {} points but the configuration needs {}",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur when loading or saving a settings document.
#[derive(Debug)]
pub enum SettingsError {
    /// Failed to read or write the settings file.
    Io(std::io::Error),
    /// The document is not valid settings JSON.
    Parse(serde_json::Error),
    /// The document parsed but describes a degenerate configuration.
    Invalid(ConfigError),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Failed to access settings file: {}", e),
            SettingsError::Parse(e) => write!(f, "Failed to parse settings: {}", e),
            SettingsError::Invalid(e) => write!(f, "Invalid settings: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Invalid(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

impl From<ConfigError> for SettingsError {
    fn from(e: ConfigError) -> Self {
        SettingsError::Invalid(e)
    }
}

/// Check that `value` is finite and strictly positive.
pub(crate) fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Check that `value` is finite.
pub(crate) fn require_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite(field))
    }
}

/// Check that a count is non-zero.
pub(crate) fn require_count(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroCount(field))
    } else {
        Ok(())
    }
}
