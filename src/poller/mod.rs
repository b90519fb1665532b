//! Job poller
//!
//! Submits a unit of remote work, queries its status at a fixed interval until
//! a terminal state is observed and then fetches the result. The remote
//! service owns every status transition; the poller only observes them.

mod clock;
mod strategy;

pub use clock::{Clock, ManualClock, TokioClock};
pub use strategy::PollStrategy;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Status of a remote job as observed by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// The terminal status, or `None` while the job is still in flight
    pub fn terminal(self) -> Option<TerminalStatus> {
        match self {
            Self::Pending | Self::Running => None,
            Self::Completed => Some(TerminalStatus::Completed),
            Self::Failed => Some(TerminalStatus::Failed),
        }
    }

    pub fn is_terminal(self) -> bool {
        self.terminal().is_some()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A status from which no further transition occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalStatus {
    Completed,
    Failed,
}

impl From<TerminalStatus> for JobStatus {
    fn from(status: TerminalStatus) -> Self {
        match status {
            TerminalStatus::Completed => Self::Completed,
            TerminalStatus::Failed => Self::Failed,
        }
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&JobStatus::from(*self), f)
    }
}

/// A unit of remote asynchronous work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Opaque identifier assigned by the remote API
    pub id: String,

    /// Status reported when the job was last observed
    pub status: JobStatus,
}

impl Job {
    pub fn new(id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}

/// Remote operations the poller drives.
///
/// Implementations report failures as plain client errors; the poller wraps
/// them into submission or query errors.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Payload sent when submitting a job
    type Request: Send + Sync;

    /// One element of a completed job's result
    type Item: Send;

    async fn create_job(&self, request: &Self::Request) -> Result<Job>;

    async fn get_job_status(&self, job_id: &str) -> Result<JobStatus>;

    async fn get_job_result(&self, job_id: &str) -> Result<Vec<Self::Item>>;
}

/// Everything known about a job once [`JobPoller::run`] returns
#[derive(Debug)]
pub struct JobOutcome<T> {
    pub job: Job,
    pub status: TerminalStatus,
    /// Present only when the job completed
    pub items: Option<Vec<T>>,
}

/// Submits jobs and waits for them using a [`PollStrategy`]
pub struct JobPoller<A> {
    api: A,
    strategy: PollStrategy,
    clock: Arc<dyn Clock>,
}

impl<A: JobApi> JobPoller<A> {
    pub fn new(api: A, strategy: PollStrategy) -> Self {
        Self {
            api,
            strategy,
            clock: Arc::new(TokioClock::new()),
        }
    }

    /// Replaces the time source, e.g. with a [`ManualClock`] in tests
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sends `request` to the remote API and returns the created job
    pub async fn submit(&self, request: &A::Request) -> Result<Job> {
        let job = self
            .api
            .create_job(request)
            .await
            .map_err(Error::submission)?;
        info!(job_id = %job.id, status = %job.status, "Job submitted");
        Ok(job)
    }

    /// Waits for `job_id` to reach a terminal state using the poller's strategy
    pub async fn await_completion(&self, job_id: &str) -> Result<TerminalStatus> {
        self.await_completion_with(job_id, &self.strategy).await
    }

    /// Waits for `job_id` to reach a terminal state using `strategy`.
    ///
    /// The first status query is issued immediately. A failed job is returned
    /// as [`TerminalStatus::Failed`], not as an error. The wait gives up with
    /// [`Error::PollingTimeout`] as soon as one more interval would overrun
    /// the timeout.
    pub async fn await_completion_with(
        &self,
        job_id: &str,
        strategy: &PollStrategy,
    ) -> Result<TerminalStatus> {
        let started = self.clock.elapsed();
        let mut attempts: u32 = 0;

        loop {
            if strategy.cancel.is_cancelled() {
                return Err(Error::Cancelled {
                    job_id: job_id.to_string(),
                });
            }

            attempts += 1;
            let deadline = async {
                match strategy.timeout {
                    Some(timeout) => {
                        let waited = self.clock.elapsed().saturating_sub(started);
                        self.clock.sleep(timeout.saturating_sub(waited)).await;
                        timeout
                    }
                    None => std::future::pending::<Duration>().await,
                }
            };

            // A stalled query must not outlive the timeout or the token.
            let status = tokio::select! {
                biased;
                status = self.api.get_job_status(job_id) => {
                    status.map_err(|e| Error::transient(job_id, e))?
                }
                _ = strategy.cancel.cancelled() => {
                    return Err(Error::Cancelled {
                        job_id: job_id.to_string(),
                    });
                }
                timeout = deadline => {
                    return Err(Self::timed_out(job_id, timeout, attempts));
                }
            };
            debug!(job_id, %status, attempts, "Checked job status");

            if let Some(terminal) = status.terminal() {
                match terminal {
                    TerminalStatus::Completed => info!(job_id, attempts, "Job completed"),
                    TerminalStatus::Failed => warn!(job_id, attempts, "Job failed"),
                }
                return Ok(terminal);
            }

            let delay = strategy.next_delay();
            if let Some(timeout) = strategy.timeout {
                let waited = self.clock.elapsed().saturating_sub(started);
                if waited.saturating_add(delay) > timeout {
                    return Err(Self::timed_out(job_id, timeout, attempts));
                }
            }

            tokio::select! {
                biased;
                _ = strategy.cancel.cancelled() => {
                    return Err(Error::Cancelled {
                        job_id: job_id.to_string(),
                    });
                }
                _ = self.clock.sleep(delay) => {}
            }
        }
    }

    fn timed_out(job_id: &str, timeout: Duration, attempts: u32) -> Error {
        warn!(job_id, ?timeout, attempts, "Gave up waiting for job");
        Error::PollingTimeout {
            job_id: job_id.to_string(),
            timeout,
            attempts,
        }
    }

    /// Fetches the result of a completed job.
    ///
    /// The status is queried once first; anything but `completed` is an
    /// [`Error::InvalidState`].
    pub async fn fetch_result(&self, job_id: &str) -> Result<Vec<A::Item>> {
        let status = self
            .api
            .get_job_status(job_id)
            .await
            .map_err(|e| Error::transient(job_id, e))?;

        match status {
            JobStatus::Completed => self
                .api
                .get_job_result(job_id)
                .await
                .map_err(|e| Error::transient(job_id, e)),
            JobStatus::Pending | JobStatus::Running | JobStatus::Failed => {
                Err(Error::InvalidState {
                    job_id: job_id.to_string(),
                    status,
                })
            }
        }
    }

    /// Submits `request`, waits for it and fetches the result if it completed
    pub async fn run(&self, request: &A::Request) -> Result<JobOutcome<A::Item>> {
        let mut job = self.submit(request).await?;
        let status = self.await_completion(&job.id).await?;
        job.status = status.into();

        let items = match status {
            TerminalStatus::Completed => Some(self.fetch_result(&job.id).await?),
            TerminalStatus::Failed => None,
        };

        Ok(JobOutcome { job, status, items })
    }
}
