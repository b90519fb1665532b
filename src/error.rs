//! Error types shared by the client and the job poller

use std::time::Duration;

use thiserror::Error;

use crate::poller::JobStatus;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring, submitting or polling a job
#[derive(Debug, Error)]
pub enum Error {
    /// A required setting (the API key) is missing or empty
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote API rejected the submission of a job
    #[error("job submission failed: {source}")]
    Submission {
        #[source]
        source: Box<Error>,
    },

    /// The job did not reach a terminal state within the configured timeout
    #[error("job {job_id} not terminal after {timeout:?} ({attempts} status queries)")]
    PollingTimeout {
        job_id: String,
        timeout: Duration,
        attempts: u32,
    },

    /// A single status or result query failed
    #[error("query for job {job_id} failed: {source}")]
    TransientQuery {
        job_id: String,
        #[source]
        source: Box<Error>,
    },

    /// A result was requested for a job that has not completed
    #[error("job {job_id} is {status}, result is only available once completed")]
    InvalidState { job_id: String, status: JobStatus },

    /// Waiting was aborted through the cancellation token
    #[error("waiting for job {job_id} was cancelled")]
    Cancelled { job_id: String },

    /// The API answered with a non-success status code
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The HTTP request itself failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A local file could not be read, e.g. before an upload
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The API answered with a body that could not be decoded
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl Error {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn submission(source: Error) -> Self {
        Self::Submission {
            source: Box::new(source),
        }
    }

    pub(crate) fn transient(job_id: &str, source: Error) -> Self {
        Self::TransientQuery {
            job_id: job_id.to_string(),
            source: Box::new(source),
        }
    }

    /// Check if the API reported a rate limit (HTTP 429)
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429,
            Self::Submission { source } | Self::TransientQuery { source, .. } => {
                source.is_rate_limited()
            }
            _ => false,
        }
    }
}
