use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use super::misc::Usage;
use super::OpenAIClient;
use crate::error::Result;

/// Represents the response from a chat model API call to OpenAI.
///
/// Contains fields that provide information about the model used, the choices made by the model,
/// the unique ID for the API call, and usage data regarding the number of tokens processed.
#[derive(Deserialize, Debug)]
pub struct Response {
    /// Unique ID for the API call.
    pub id: Option<String>,

    /// Type of the API object. For a chat model, this should be 'chat.completion'.
    pub object: Option<String>,

    /// UNIX timestamp indicating when the chat completion was created.
    pub created: Option<u64>,

    /// The model that was used for the chat session.
    pub model: Option<String>,

    /// Choices made by the chat model.
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Information on the number of tokens processed in the request.
    pub usage: Option<Usage>,
}

impl Response {
    /// The message of the first choice, if the model returned any
    pub fn first_message(&self) -> Option<&Message> {
        self.choices.first().map(|choice| &choice.message)
    }
}

/// Represents a choice made by the model in a chat API call.
#[derive(Deserialize, Debug)]
pub struct Choice {
    /// The message that corresponds to the choice made.
    pub message: Message,

    /// Reason for finishing the generation.
    pub finish_reason: Option<String>,

    /// Index of the choice in the list of choices.
    pub index: u64,
}

/// Enumeration of roles for authors of messages.
///
/// Shared by chat completions and assistant threads.
#[derive(Serialize, Deserialize, Clone, Debug, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Function,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Function => "function",
        };
        f.write_str(s)
    }
}

/// Represents a single Message exchanged with the chat completions endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    /// The role of the messages author. One of system, user, assistant, or function.
    pub role: MessageRole,

    /// The contents of the message. May be null for assistant messages with function calls.
    pub content: Option<String>,

    /// The name of the author of this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    /// Constructs a new `Message` instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use aipoll::openai::chat::{MessageRole, Message};
    ///
    /// let user_message = Message::new(MessageRole::User, "Hello, assistant!");
    /// assert_eq!(user_message.to_string(), "user: Hello, assistant!");
    /// ```
    pub fn new<S: Into<String>>(role: MessageRole, content: S) -> Self {
        Self {
            role,
            content: Some(content.into()),
            name: None,
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.role, self.content.as_deref().unwrap_or_default())
    }
}

/// This struct is used for chat completions with OpenAI's models.
/// It contains all the parameters that can be set for an API request.
///
/// All fields with an `Option` type can be omitted from the JSON payload,
/// thanks to the `skip_serializing_if` attribute.
///
/// For more information check the official [openAI API documentation](https://platform.openai.com/docs/api-reference/chat/create)
///
/// # Example
///
/// ```
/// use aipoll::openai::Chat;
///
/// let chat = Chat::default()
///     .set_primer("You are a poetic assistant.")
///     .add_message("Compose a poem that explains recursion.");
/// assert_eq!(chat.messages.len(), 2);
/// ```
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Chat {
    /// ID of the model to use.
    pub model: String,

    /// A list of messages comprising the conversation so far
    pub messages: Vec<Message>,

    /// What sampling temperature to use, between 0 and 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// An alternative to sampling with temperature, called nucleus sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// How many chat completion choices to generate for each input message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<i64>,

    /// Up to 4 sequences where the API will stop generating further tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,

    /// The maximum number of tokens to generate in the chat completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,

    /// Number between -2.0 and 2.0. Positive values penalize new tokens based on whether they appear in the text so far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,

    /// Number between -2.0 and 2.0. Positive values penalize new tokens based on their existing frequency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,

    /// Modify the likelihood of specified tokens appearing in the completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<String, f32>>,

    /// A unique identifier representing your end-user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Chat {
    const DEFAULT_TEMPERATURE: f64 = 1.0;
    const DEFAULT_MAX_TOKENS: u64 = 2048;
    const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

    pub fn get_default_temperature() -> f64 {
        Self::DEFAULT_TEMPERATURE
    }

    pub fn get_default_max_tokens() -> u64 {
        Self::DEFAULT_MAX_TOKENS
    }

    pub fn get_default_model() -> &'static str {
        Self::DEFAULT_MODEL
    }

    pub fn set_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    pub fn set_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn set_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Puts a system message in front of the conversation
    pub fn set_primer<S: Into<String>>(mut self, primer_msg: S) -> Self {
        self.messages
            .insert(0, Message::new(MessageRole::System, primer_msg));
        self
    }

    /// Appends a user message
    pub fn add_message<S: Into<String>>(mut self, content: S) -> Self {
        self.messages.push(Message::new(MessageRole::User, content));
        self
    }
}

impl Default for Chat {
    fn default() -> Self {
        Self {
            model: Self::get_default_model().into(),
            messages: vec![],
            temperature: Some(Self::get_default_temperature()),
            top_p: None,
            n: None,
            stop: None,
            max_tokens: Some(Self::get_default_max_tokens()),
            presence_penalty: None,
            frequency_penalty: None,
            logit_bias: None,
            user: None,
        }
    }
}

impl OpenAIClient {
    /// Issues a single, stateless chat completion request
    pub async fn chat_completion(&self, chat: &Chat) -> Result<Response> {
        let response: Response = self
            ._send(self._request(Method::POST, "chat/completions").json(chat))
            .await?;
        info!(
            model = response.model.as_deref().unwrap_or_default(),
            choices = response.choices.len(),
            "Chat completion received"
        );
        Ok(response)
    }
}
