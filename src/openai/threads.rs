use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::chat::MessageRole;
use super::misc::ListResponse;
use super::OpenAIClient;
use crate::error::Result;

/// A conversation session between an assistant and a user.
///
/// Threads store messages and handle truncation to fit the model's context.
#[derive(Deserialize, Clone, Debug)]
pub struct Thread {
    pub id: String,

    /// Will default to "thread".
    pub object: String,

    pub created_at: u64,

    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// A message stored on a thread, written by the user or by the assistant.
#[derive(Deserialize, Clone, Debug)]
pub struct ThreadMessage {
    pub id: String,

    /// Will default to "thread.message".
    pub object: String,

    pub created_at: u64,

    pub thread_id: String,

    pub role: MessageRole,

    /// Content parts, in the order they were produced
    #[serde(default)]
    pub content: Vec<MessageContent>,

    /// Set when the message was written by an assistant
    pub assistant_id: Option<String>,

    /// The run that produced this message, if any
    pub run_id: Option<String>,

    #[serde(default)]
    pub file_ids: Vec<String>,
}

impl ThreadMessage {
    /// The text parts of the message joined by newlines; image parts are skipped
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                MessageContent::Text { text } => Some(text.value.as_str()),
                MessageContent::ImageFile { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for ThreadMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.role, self.text())
    }
}

/// One part of a thread message
#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    ImageFile { image_file: ImageFile },
}

#[derive(Deserialize, Clone, Debug)]
pub struct TextContent {
    pub value: String,

    /// File citations and paths, kept as raw JSON
    #[serde(default)]
    pub annotations: Vec<serde_json::Value>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ImageFile {
    pub file_id: String,
}

/// Request body used to add a message to a thread.
#[derive(Serialize, Clone, Debug)]
pub struct CreateMessage {
    /// Only `user` is accepted by the API.
    pub role: MessageRole,

    pub content: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_ids: Vec<String>,
}

impl CreateMessage {
    /// A user message with the given text
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            file_ids: vec![],
        }
    }

    pub fn add_file<S: Into<String>>(mut self, file_id: S) -> Self {
        self.file_ids.push(file_id.into());
        self
    }
}

impl OpenAIClient {
    const MESSAGES_PAGE_SIZE: u32 = 100;

    pub async fn create_thread(&self) -> Result<Thread> {
        let thread: Thread = self
            ._send(
                self._beta_request(Method::POST, "threads")
                    .json(&serde_json::json!({})),
            )
            .await?;
        info!(thread_id = %thread.id, "Thread created");
        Ok(thread)
    }

    pub async fn create_message(
        &self,
        thread_id: &str,
        request: &CreateMessage,
    ) -> Result<ThreadMessage> {
        let message: ThreadMessage = self
            ._send(
                self._beta_request(Method::POST, &format!("threads/{}/messages", thread_id))
                    .json(request),
            )
            .await?;
        info!(thread_id, message_id = %message.id, "Message added to thread");
        Ok(message)
    }

    /// Lists every message on the thread, oldest first.
    ///
    /// Follows the `after` cursor until the API reports no further pages.
    pub async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>> {
        let path = format!("threads/{}/messages", thread_id);
        let limit = Self::MESSAGES_PAGE_SIZE.to_string();
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("order", "asc"), ("limit", limit.as_str())];
            if let Some(cursor) = after.as_deref() {
                query.push(("after", cursor));
            }

            let page: ListResponse<ThreadMessage> = self
                ._send(self._beta_request(Method::GET, &path).query(&query))
                .await?;
            debug!(thread_id, count = page.data.len(), has_more = page.has_more, "Fetched messages page");

            messages.extend(page.data);
            match page.last_id {
                Some(last_id) if page.has_more => after = Some(last_id),
                _ => break,
            }
        }

        Ok(messages)
    }
}
