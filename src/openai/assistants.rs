use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::OpenAIClient;
use crate::error::Result;

/// A tool an assistant may call while running.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    /// Lets the assistant write and run Python code
    CodeInterpreter,

    /// Lets the assistant search the files attached to it
    Retrieval,

    /// A function the caller executes on behalf of the assistant
    Function { function: FunctionDefinition },
}

/// Describes a function the model may generate JSON inputs for.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FunctionDefinition {
    /// The name of the function to be called.
    pub name: String,

    /// A description of what the function does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The parameters the function accepts, described as a JSON Schema object.
    pub parameters: serde_json::Value,
}

/// Represents an `Assistant` object of the `OpenAI` assistants API.
///
/// For more information check the official [openAI API documentation](https://platform.openai.com/docs/api-reference/assistants)
#[derive(Deserialize, Clone, Debug)]
pub struct Assistant {
    /// The identifier, which can be referenced in API endpoints.
    pub id: String,

    /// Will default to "assistant".
    pub object: String,

    /// The Unix timestamp (in seconds) for when the assistant was created.
    pub created_at: u64,

    pub name: Option<String>,

    pub description: Option<String>,

    /// ID of the model to use.
    pub model: String,

    /// The system instructions that the assistant uses.
    pub instructions: Option<String>,

    #[serde(default)]
    pub tools: Vec<Tool>,

    /// IDs of the files attached to this assistant.
    #[serde(default)]
    pub file_ids: Vec<String>,
}

/// Request body used to create an assistant.
///
/// An assistant should be created once and reused, not created per request.
///
/// # Example
///
/// ```
/// use aipoll::openai::{CreateAssistant, Tool};
///
/// let request = CreateAssistant::default()
///     .set_name("Math Tutor")
///     .set_instructions("You are a personal math tutor.")
///     .add_tool(Tool::CodeInterpreter);
/// assert_eq!(request.model, CreateAssistant::get_default_model());
/// ```
#[derive(Serialize, Clone, Debug)]
pub struct CreateAssistant {
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_ids: Vec<String>,
}

impl CreateAssistant {
    const DEFAULT_MODEL: &str = "gpt-4-1106-preview";

    pub fn get_default_model() -> &'static str {
        Self::DEFAULT_MODEL
    }

    pub fn set_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    pub fn set_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn set_instructions<S: Into<String>>(mut self, instructions: S) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn add_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Attaches an uploaded file, e.g. for the retrieval tool
    pub fn add_file<S: Into<String>>(mut self, file_id: S) -> Self {
        self.file_ids.push(file_id.into());
        self
    }
}

impl Default for CreateAssistant {
    fn default() -> Self {
        Self {
            model: Self::get_default_model().into(),
            name: None,
            description: None,
            instructions: None,
            tools: vec![],
            file_ids: vec![],
        }
    }
}

impl OpenAIClient {
    pub async fn create_assistant(&self, request: &CreateAssistant) -> Result<Assistant> {
        let assistant: Assistant = self
            ._send(self._beta_request(Method::POST, "assistants").json(request))
            .await?;
        info!(assistant_id = %assistant.id, model = %assistant.model, "Assistant created");
        Ok(assistant)
    }
}
