//! Client configuration
//!
//! The API key is the only required setting. It is read once at startup and
//! handed to [`OpenAIClient`](crate::openai::OpenAIClient) explicitly.

use crate::error::{Error, Result};

/// Connection settings for the hosted API
#[derive(Clone)]
pub struct Config {
    /// Secret credential sent as a bearer token
    pub api_key: String,

    /// Base URL of the API (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Optional organization header
    pub organization: Option<String>,
}

impl Config {
    const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            organization: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn get_default_base_url() -> &'static str {
        Self::DEFAULT_BASE_URL
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - OPENAI_API_KEY (required)
    /// - OPENAI_BASE_URL (optional, default: https://api.openai.com/v1)
    /// - OPENAI_ORGANIZATION (optional)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::Configuration("OPENAI_API_KEY environment variable not set".into())
            })?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup("OPENAI_BASE_URL").filter(|url| !url.is_empty()) {
            config = config.with_base_url(base_url);
        }
        if let Some(organization) = lookup("OPENAI_ORGANIZATION").filter(|org| !org.is_empty()) {
            config = config.with_organization(organization);
        }
        Ok(config)
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .finish()
    }
}
