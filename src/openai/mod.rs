pub mod assistants;
pub mod chat;
pub mod files;
pub mod misc;
pub mod runs;
pub mod threads;

pub use assistants::{Assistant, CreateAssistant, Tool};
pub use chat::{Chat, Message, MessageRole};
pub use files::{FileObject, FileStatus, FileUpload, FileUploads};
pub use runs::{AssistantRuns, CreateRun, Run, RunStatus};
pub use threads::{CreateMessage, Thread, ThreadMessage};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use misc::OpenAIError;

/// HTTP client for the `OpenAI` API.
///
/// Built once from a [`Config`] and passed by reference to every call site.
/// Cloning is cheap, the underlying connection pool is shared.
///
/// # Example
///
/// ```
/// use aipoll::config::Config;
/// use aipoll::openai::OpenAIClient;
///
/// let client = OpenAIClient::new(Config::new("sk-test"));
/// assert_eq!(client.config().base_url, "https://api.openai.com/v1");
/// ```
#[derive(Clone, Debug)]
pub struct OpenAIClient {
    client: Client,
    config: Config,
}

impl OpenAIClient {
    const OPENAI_BETA_HEADER: &str = "OpenAI-Beta";
    const ASSISTANTS_BETA: &str = "assistants=v1";

    pub fn new(config: Config) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Uses a preconfigured `reqwest::Client` (timeouts, proxies, TLS)
    pub fn with_client(config: Config, client: Client) -> Self {
        Self { client, config }
    }

    /// Reads the configuration from the environment. Fails before any
    /// network call if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Config::from_env()?))
    }

    /// Like [`OpenAIClient::from_env`] with an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self::new(Config::from_lookup(lookup)?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn _url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn _request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, self._url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_key));
        if let Some(organization) = &self.config.organization {
            builder = builder.header("OpenAI-Organization", organization);
        }
        builder
    }

    /// Request against one of the assistants endpoints, which are still in beta
    pub(crate) fn _beta_request(&self, method: Method, path: &str) -> RequestBuilder {
        self._request(method, path)
            .header(Self::OPENAI_BETA_HEADER, Self::ASSISTANTS_BETA)
    }

    /// Sends the request and decodes a JSON body, mapping non-2xx answers to
    /// [`Error::Api`]
    pub(crate) async fn _send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Received response");

        if !status.is_success() {
            let body = response.text().await?;
            let message = serde_json::from_str::<OpenAIError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(Error::api(status.as_u16(), message));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::Parse(format!("Failed to parse JSON response: {}", e)))
    }
}
