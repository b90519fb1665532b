use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::threads::ThreadMessage;
use super::OpenAIClient;
use crate::error::Result;
use crate::poller::{Job, JobApi, JobStatus};

/// Lifecycle of a run as reported by the API
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
}

impl From<RunStatus> for JobStatus {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Queued => Self::Pending,
            // A run waiting for tool outputs stays in flight until a timeout ends the wait.
            RunStatus::InProgress | RunStatus::RequiresAction | RunStatus::Cancelling => {
                Self::Running
            }
            RunStatus::Completed => Self::Completed,
            RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired => Self::Failed,
        }
    }
}

/// Why a run failed
#[derive(Deserialize, Clone, Debug)]
pub struct LastError {
    /// One of `server_error` or `rate_limit_exceeded`.
    pub code: String,

    pub message: String,
}

/// An invocation of an assistant on a thread.
///
/// The assistant uses its configuration and the thread's messages to call
/// models and tools; as part of a run it appends messages to the thread.
#[derive(Deserialize, Clone, Debug)]
pub struct Run {
    pub id: String,

    /// Will default to "thread.run".
    pub object: String,

    pub created_at: u64,

    pub thread_id: String,

    pub assistant_id: String,

    pub status: RunStatus,

    pub last_error: Option<LastError>,

    pub model: Option<String>,

    pub instructions: Option<String>,

    pub started_at: Option<u64>,

    pub completed_at: Option<u64>,

    pub failed_at: Option<u64>,
}

/// Request body used to start a run.
#[derive(Serialize, Clone, Debug)]
pub struct CreateRun {
    pub assistant_id: String,

    /// Overrides the assistant's model for this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Overrides the assistant's instructions for this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl CreateRun {
    pub fn new<S: Into<String>>(assistant_id: S) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            model: None,
            instructions: None,
        }
    }

    pub fn set_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn set_instructions<S: Into<String>>(mut self, instructions: S) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

impl OpenAIClient {
    pub async fn create_run(&self, thread_id: &str, request: &CreateRun) -> Result<Run> {
        let run: Run = self
            ._send(
                self._beta_request(Method::POST, &format!("threads/{}/runs", thread_id))
                    .json(request),
            )
            .await?;
        info!(thread_id, run_id = %run.id, status = ?run.status, "Run created");
        Ok(run)
    }

    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self._send(self._beta_request(
            Method::GET,
            &format!("threads/{}/runs/{}", thread_id, run_id),
        ))
        .await
    }
}

/// Runs of assistants on a single thread, driven as poller jobs.
///
/// The job id is the run id; the result is every message on the thread,
/// oldest first.
///
/// # Example
///
/// ```no_run
/// use aipoll::openai::{AssistantRuns, CreateRun, OpenAIClient};
/// use aipoll::poller::{JobPoller, PollStrategy};
///
/// # async fn demo(client: OpenAIClient) -> aipoll::Result<()> {
/// let thread = client.create_thread().await?;
/// let poller = JobPoller::new(AssistantRuns::new(client, &thread.id), PollStrategy::default());
/// let outcome = poller.run(&CreateRun::new("asst_123")).await?;
/// println!("run finished as {}", outcome.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct AssistantRuns {
    client: OpenAIClient,
    thread_id: String,
}

impl AssistantRuns {
    pub fn new<S: Into<String>>(client: OpenAIClient, thread_id: S) -> Self {
        Self {
            client,
            thread_id: thread_id.into(),
        }
    }
}

#[async_trait]
impl JobApi for AssistantRuns {
    type Request = CreateRun;
    type Item = ThreadMessage;

    async fn create_job(&self, request: &CreateRun) -> Result<Job> {
        let run = self.client.create_run(&self.thread_id, request).await?;
        Ok(Job::new(run.id, run.status.into()))
    }

    async fn get_job_status(&self, job_id: &str) -> Result<JobStatus> {
        let run = self.client.retrieve_run(&self.thread_id, job_id).await?;
        if let Some(error) = &run.last_error {
            warn!(run_id = job_id, code = %error.code, message = %error.message, "Run reported an error");
        }
        Ok(run.status.into())
    }

    async fn get_job_result(&self, _job_id: &str) -> Result<Vec<ThreadMessage>> {
        self.client.list_messages(&self.thread_id).await
    }
}
