//! Configuration management and validation.
//!
//! Provides the processing parameters shared by the pipeline, the capture
//! source and the CLI.

use crate::constants::{CAPTURE_FILE_EXTENSION, DEFAULT_UTC_OFFSET_HOURS};
use crate::error::{MplError, Result};
use serde::{Deserialize, Serialize};

/// How captures whose cloud matrix is not 3x3 are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloudLayerPolicy {
    /// Reject the capture with a malformed shape error
    Strict,
    /// Fill missing layers or values with NaN and ignore extras
    PadWithNan,
}

/// Global configuration for capture processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MplConfig {
    /// Maximum captures processed at the same time
    pub max_concurrent_files: usize,

    /// Hours subtracted from UTC to get local time
    pub utc_offset_hours: i64,

    /// Extension of capture files (without dot)
    pub file_extension: String,

    /// Handling of non-conforming cloud matrices
    pub cloud_layer_policy: CloudLayerPolicy,
}

impl Default for MplConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: num_cpus::get(),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            file_extension: CAPTURE_FILE_EXTENSION.to_string(),
            cloud_layer_policy: CloudLayerPolicy::Strict,
        }
    }
}

impl MplConfig {
    /// Set maximum concurrent files (1 processes captures one by one)
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Set the fixed UTC offset
    pub fn with_utc_offset_hours(mut self, hours: i64) -> Self {
        self.utc_offset_hours = hours;
        self
    }

    /// Set the capture file extension
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    /// Set the cloud layer policy
    pub fn with_cloud_layer_policy(mut self, policy: CloudLayerPolicy) -> Self {
        self.cloud_layer_policy = policy;
        self
    }

    /// Check values that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(MplError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }
        if self.file_extension.is_empty() || self.file_extension.starts_with('.') {
            return Err(MplError::Configuration {
                message: format!(
                    "file extension '{}' must be non-empty and given without a leading dot",
                    self.file_extension
                ),
            });
        }
        if !(-24..=24).contains(&self.utc_offset_hours) {
            return Err(MplError::Configuration {
                message: format!(
                    "UTC offset of {} hours is outside -24..=24",
                    self.utc_offset_hours
                ),
            });
        }
        Ok(())
    }
}
