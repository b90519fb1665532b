use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method};
use serde::{Deserialize, Serialize};
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::info;

use super::OpenAIClient;
use crate::error::Result;
use crate::poller::{Job, JobApi, JobStatus};

/// Processing state of an uploaded file
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Uploaded,
    Processed,
    Error,
    Deleted,
}

impl From<FileStatus> for JobStatus {
    fn from(status: FileStatus) -> Self {
        match status {
            FileStatus::Uploaded => Self::Pending,
            FileStatus::Processed => Self::Completed,
            FileStatus::Error | FileStatus::Deleted => Self::Failed,
        }
    }
}

/// Represents a file in the OpenAI Files API.
///
/// For more information check the official [openAI API documentation](https://platform.openai.com/docs/api-reference/files)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FileObject {
    /// Unique ID of the file.
    pub id: String,

    /// The type of the object.
    pub object: String,

    /// The size of the file in bytes.
    pub bytes: u64,

    /// The timestamp at which the file was created.
    pub created_at: u64,

    /// The name of the file.
    pub filename: String,

    /// The intended purpose of the file.
    pub purpose: String,

    /// Processing state. Files without a reported state are ready to use.
    pub status: Option<FileStatus>,

    /// Why processing failed, when `status` is `error`
    pub status_details: Option<String>,
}

impl FileObject {
    pub fn job_status(&self) -> JobStatus {
        self.status
            .map(JobStatus::from)
            .unwrap_or(JobStatus::Completed)
    }
}

/// A local file to upload and the purpose it is uploaded for
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub path: PathBuf,
    pub purpose: String,
}

impl FileUpload {
    const DEFAULT_PURPOSE: &str = "assistants";

    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            purpose: Self::DEFAULT_PURPOSE.into(),
        }
    }

    pub fn set_purpose<S: Into<String>>(mut self, purpose: S) -> Self {
        self.purpose = purpose.into();
        self
    }
}

impl OpenAIClient {
    async fn _get_streamed_body<P: AsRef<Path>>(&self, path: P) -> Result<Body> {
        if !path.as_ref().exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.as_ref().display()),
            )
            .into());
        }
        let file_stream_body = tokio::fs::File::open(path).await?;
        let stream = FramedRead::new(file_stream_body, BytesCodec::new());
        Ok(Body::wrap_stream(stream))
    }

    async fn _create_file_part<P: AsRef<Path>>(&self, path: P) -> Result<Part> {
        let file_name = path
            .as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let streamed_body = self._get_streamed_body(path).await?;
        let part_stream = Part::stream(streamed_body)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        Ok(part_stream)
    }

    /// Streams a local file to the Files API
    pub async fn upload_file<P: AsRef<Path>>(&self, path: P, purpose: &str) -> Result<FileObject> {
        let part = self._create_file_part(&path).await?;
        let form = Form::new()
            .text("purpose", purpose.to_string())
            .part("file", part);

        let file: FileObject = self
            ._send(self._request(Method::POST, "files").multipart(form))
            .await?;
        info!(file_id = %file.id, filename = %file.filename, bytes = file.bytes, "File uploaded");
        Ok(file)
    }

    pub async fn retrieve_file(&self, file_id: &str) -> Result<FileObject> {
        self._send(self._request(Method::GET, &format!("files/{}", file_id)))
            .await
    }
}

/// File uploads driven as poller jobs: the job completes once the API has
/// processed the file.
#[derive(Clone, Debug)]
pub struct FileUploads {
    client: OpenAIClient,
}

impl FileUploads {
    pub fn new(client: OpenAIClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobApi for FileUploads {
    type Request = FileUpload;
    type Item = FileObject;

    async fn create_job(&self, request: &FileUpload) -> Result<Job> {
        let file = self
            .client
            .upload_file(&request.path, &request.purpose)
            .await?;
        Ok(Job::new(file.id.clone(), file.job_status()))
    }

    async fn get_job_status(&self, job_id: &str) -> Result<JobStatus> {
        Ok(self.client.retrieve_file(job_id).await?.job_status())
    }

    async fn get_job_result(&self, job_id: &str) -> Result<Vec<FileObject>> {
        Ok(vec![self.client.retrieve_file(job_id).await?])
    }
}
