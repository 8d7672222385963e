//! Core runtime configuration.
//!
//! Resolved once when the host shell starts and passed into [`Store::open`].
//! The library never reads environment variables itself.
//!
//! [`Store::open`]: crate::store::Store::open

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::workflow::TransitionPolicy;

/// Queue rows show this many characters of the chief complaint.
pub const DEFAULT_COMPLAINT_PREVIEW_CHARS: usize = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ClinicConfig {
    data_dir: PathBuf,
    transition_policy: TransitionPolicy,
    complaint_preview_chars: usize,
}

impl ClinicConfig {
    /// Create a configuration rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> ConfigResult<Self> {
        let data_dir = data_dir.into();
        if data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir cannot be empty".into()));
        }

        Ok(Self {
            data_dir,
            transition_policy: TransitionPolicy::default(),
            complaint_preview_chars: DEFAULT_COMPLAINT_PREVIEW_CHARS,
        })
    }

    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    pub fn with_complaint_preview_chars(mut self, chars: usize) -> ConfigResult<Self> {
        if chars == 0 {
            return Err(ConfigError::Invalid(
                "complaint_preview_chars must be positive".into(),
            ));
        }
        self.complaint_preview_chars = chars;
        Ok(self)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn transition_policy(&self) -> TransitionPolicy {
        self.transition_policy
    }

    pub fn complaint_preview_chars(&self) -> usize {
        self.complaint_preview_chars
    }
}
