//! Sampling error types

use thiserror::Error;

/// Result type for sampling sessions
pub type SamplingResult<T> = Result<T, SamplingError>;

/// Conditions that end a sampling session without a reading
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    /// The signal query reported a non-success outcome
    #[error("Signal query failed{}: {detail}", status_suffix(.status))]
    QueryFailed { status: Option<i32>, detail: String },

    /// Every attempt completed but no reading was obtained
    #[error("No networks found or connected after {attempts} attempts")]
    NoSignal { attempts: usize },

    /// No signal reader is available on this host
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl SamplingError {
    pub fn query_failed(status: Option<i32>, detail: impl Into<String>) -> Self {
        SamplingError::QueryFailed {
            status,
            detail: detail.into(),
        }
    }

    /// Process exit code the CLI reports for this condition
    pub fn exit_code(&self) -> i32 {
        match self {
            SamplingError::QueryFailed { .. } => 1,
            SamplingError::UnsupportedPlatform(_) => 2,
            SamplingError::NoSignal { .. } => 3,
        }
    }
}

fn status_suffix(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" with return code {}", code),
        None => String::new(),
    }
}
