use serde::{Deserialize, Serialize};
// =-=-=-=-=--=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// COMMON STRUCT DEFINITIONS
// =-=-=-=-=--=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// A page of objects returned by one of the list endpoints.
///
/// Pages are cursor based: pass `last_id` as `after` to fetch the next page
/// while `has_more` is set.
#[derive(Debug, Deserialize, Clone)]
pub struct ListResponse<T> {
    /// Will default to "list".
    pub object: String,

    /// The objects on this page
    pub data: Vec<T>,

    pub first_id: Option<String>,

    pub last_id: Option<String>,

    /// Whether more objects are available after `last_id`
    #[serde(default)]
    pub has_more: bool,
}

/// Represents the usage data from an API call.
///
/// This includes the number of tokens used for the prompt, the completion, and the total tokens.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Usage {
    /// Number of tokens used in the prompt.
    pub prompt_tokens: u64,

    /// Number of tokens used in the completion.
    pub completion_tokens: Option<u64>,

    /// Total number of tokens used in the API call.
    pub total_tokens: u64,
}

/// Represents an error returned from the `OpenAI`' API.
///
/// This struct is used to deserialize the JSON object that the `OpenAI`' API
/// returns when a request fails. The API's error object has a fixed structure,
/// so this struct can directly map to it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenAIError {
    /// Contains specific details about the error.
    pub error: ErrorDetails,
}

/// Contains detailed information about an error from the `OpenAI`' API.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorDetails {
    /// A human-readable message providing more details about the error.
    pub message: String,

    /// The type of error returned. This can be used to categorize errors.
    pub r#type: Option<String>,

    /// (Optional) The specific parameter in the request that caused the error.
    pub param: Option<String>,

    /// (Optional) A code corresponding to the error.
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "param": null, "code": "invalid_api_key"}}"#;
        let err: OpenAIError = serde_json::from_str(body).unwrap();
        assert_eq!(err.error.message, "Incorrect API key provided");
        assert_eq!(err.error.code.as_deref(), Some("invalid_api_key"));
        assert!(err.error.param.is_none());
    }

    #[test]
    fn test_list_without_cursor_fields() {
        let body = r#"{"object": "list", "data": [1, 2, 3]}"#;
        let page: ListResponse<u32> = serde_json::from_str(body).unwrap();
        assert_eq!(page.data, vec![1, 2, 3]);
        assert!(!page.has_more);
        assert!(page.last_id.is_none());
    }
}
