use thiserror::Error;

/// Errors produced by the monitoring core.
///
/// None of these are fatal: callers log the failure, skip the affected
/// record or cycle, and keep going. They are typed so tests can assert on
/// the exact failure path.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Probe failure: {0}")]
    ProbeFailure(String),

    #[error("Sampling failure: {0}")]
    SamplingFailure(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
