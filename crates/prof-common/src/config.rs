//! Configuration for sampling event sources.
//!
//! Supports TOML deserialization with sensible defaults for development
//! and explicit values for production deployment.

use crate::error::{ProfError, ProfResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// A driver period shorter than this is indistinguishable from spinning.
const MAX_FREQUENCY: u32 = 1_000_000;

/// Sampler configuration.
///
/// The frequency is fixed for the lifetime of a strategy instance;
/// reconfiguring means building a new event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Sampling frequency in periods per second.
    pub frequency: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { frequency: 100 }
    }
}

impl SamplerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> ProfResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProfError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> ProfResult<Self> {
        toml::from_str(content).map_err(|e| ProfError::Config(format!("failed to parse TOML: {e}")))
    }

    /// Serialize configuration to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> ProfResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ProfError::Config(format!("failed to serialize TOML: {e}")))
    }

    /// Check that the configured frequency yields a usable driver period.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero frequency or one above 1 MHz (the
    /// resulting period would round below one microsecond).
    pub fn validate(&self) -> ProfResult<()> {
        if self.frequency == 0 {
            return Err(ProfError::Config(
                "sampling frequency must be positive".into(),
            ));
        }
        if self.frequency > MAX_FREQUENCY {
            return Err(ProfError::Config(format!(
                "sampling frequency {} exceeds maximum {MAX_FREQUENCY}",
                self.frequency
            )));
        }
        Ok(())
    }

    /// Driver period corresponding to the configured frequency.
    ///
    /// Computed as `1_000_000 / frequency` microseconds, matching the
    /// tick granularity the clock driver sleeps between periods.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.frequency.max(1)))
    }
}
