//! Mock API tests for the OpenAI client and its poller adapters
//!
//! Response bodies follow the shapes documented in the OpenAI API reference:
//! https://platform.openai.com/docs/api-reference/assistants

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use aipoll::config::Config;
use aipoll::openai::{
    AssistantRuns, Chat, CreateAssistant, CreateMessage, CreateRun, FileUpload, FileUploads,
    MessageRole, OpenAIClient, Tool,
};
use aipoll::poller::{JobPoller, JobStatus, ManualClock, PollStrategy, TerminalStatus};
use aipoll::Error;
use serde_json::json;
use wiremock::matchers::{any, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAIClient {
    OpenAIClient::new(Config::new("test-api-key").with_base_url(server.uri()))
}

fn run_body(status: &str) -> serde_json::Value {
    json!({
        "id": "run_1",
        "object": "thread.run",
        "created_at": 1699063290,
        "thread_id": "thread_1",
        "assistant_id": "asst_1",
        "status": status,
        "last_error": null,
        "model": "gpt-4-1106-preview",
        "instructions": "You are a personal math tutor.",
        "started_at": null,
        "completed_at": null,
        "failed_at": null,
        "tools": [{"type": "code_interpreter"}],
        "file_ids": [],
        "metadata": {}
    })
}

fn message_body(id: &str, role: &str, text: &str) -> serde_json::Value {
    json!({
        "id": id,
        "object": "thread.message",
        "created_at": 1699017614,
        "thread_id": "thread_1",
        "role": role,
        "content": [{"type": "text", "text": {"value": text, "annotations": []}}],
        "file_ids": [],
        "assistant_id": null,
        "run_id": null,
        "metadata": {}
    })
}

fn file_body(status: &str) -> serde_json::Value {
    json!({
        "id": "file-abc123",
        "object": "file",
        "bytes": 120000,
        "created_at": 1677610602,
        "filename": "book.pdf",
        "purpose": "assistants",
        "status": status,
        "status_details": null
    })
}

#[tokio::test]
async fn test_assistant_run_is_polled_to_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(header("OpenAI-Beta", "assistants=v1"))
        .and(body_partial_json(json!({"assistant_id": "asst_1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_body("queued")))
        .expect(1)
        .mount(&server)
        .await;

    // First status query sees the run in progress, every later one sees it completed.
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_body("in_progress")))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_body("completed")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .and(query_param("order", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                message_body("msg_1", "user", "Solve this problem: 3x + 11 = 14"),
                message_body("msg_2", "assistant", "x = 1")
            ],
            "first_id": "msg_1",
            "last_id": "msg_2",
            "has_more": false
        })))
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new());
    let poller = JobPoller::new(
        AssistantRuns::new(client(&server), "thread_1"),
        PollStrategy::new(Duration::from_secs(1)),
    )
    .with_clock(clock.clone());

    let outcome = poller.run(&CreateRun::new("asst_1")).await.unwrap();

    assert_eq!(outcome.job.id, "run_1");
    assert_eq!(outcome.status, TerminalStatus::Completed);
    let messages = outcome.items.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[1].to_string(), "assistant: x = 1");
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
}

#[tokio::test]
async fn test_expired_run_is_failed_and_has_no_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_body("expired")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let poller = JobPoller::new(
        AssistantRuns::new(client(&server), "thread_1"),
        PollStrategy::default(),
    );

    let status = poller.await_completion("run_1").await.unwrap();
    assert_eq!(status, TerminalStatus::Failed);

    let err = poller.fetch_result("run_1").await.unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidState {
            status: JobStatus::Failed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_rejected_run_is_submission_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided: test-api-key.",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let poller = JobPoller::new(
        AssistantRuns::new(client(&server), "thread_1"),
        PollStrategy::default(),
    );

    match poller.submit(&CreateRun::new("asst_1")).await.unwrap_err() {
        Error::Submission { source } => match *source {
            Error::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided: test-api-key.");
            }
            other => panic!("unexpected source {:?}", other),
        },
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_key_fails_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(run_body("completed")))
        .expect(0)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let err = OpenAIClient::from_lookup(|key: &str| {
        (key == "OPENAI_BASE_URL").then(|| base_url.clone())
    })
    .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));

    let err = OpenAIClient::from_lookup(|key: &str| match key {
        "OPENAI_API_KEY" => Some("   ".to_string()),
        "OPENAI_BASE_URL" => Some(base_url.clone()),
        _ => None,
    })
    .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));

    server.verify().await;
}

#[tokio::test]
async fn test_rate_limited_status_query_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .expect(1)
        .mount(&server)
        .await;

    let poller = JobPoller::new(
        AssistantRuns::new(client(&server), "thread_1"),
        PollStrategy::default(),
    );

    let err = poller.await_completion("run_1").await.unwrap_err();
    assert!(matches!(err, Error::TransientQuery { .. }));
    assert!(err.is_rate_limited());
}

#[tokio::test]
async fn test_messages_follow_pagination_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .and(query_param("after", "msg_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [message_body("msg_2", "assistant", "second")],
            "first_id": "msg_2",
            "last_id": "msg_2",
            "has_more": false
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [message_body("msg_1", "user", "first")],
            "first_id": "msg_1",
            "last_id": "msg_1",
            "has_more": true
        })))
        .mount(&server)
        .await;

    let messages = client(&server).list_messages("thread_1").await.unwrap();
    let texts: Vec<String> = messages.iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec!["first", "second"]);
}

#[tokio::test]
async fn test_assistant_thread_and_message_creation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/assistants"))
        .and(body_partial_json(json!({
            "name": "Math Tutor",
            "tools": [{"type": "code_interpreter"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "asst_1",
            "object": "assistant",
            "created_at": 1698984975,
            "name": "Math Tutor",
            "description": null,
            "model": "gpt-4-1106-preview",
            "instructions": "You are a personal math tutor.",
            "tools": [{"type": "code_interpreter"}],
            "file_ids": [],
            "metadata": {}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "thread_1",
            "object": "thread",
            "created_at": 1699012949,
            "metadata": {}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .and(body_partial_json(json!({"role": "user", "content": "Solve this problem: 3x + 11 = 14"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_body(
            "msg_1",
            "user",
            "Solve this problem: 3x + 11 = 14",
        )))
        .mount(&server)
        .await;

    let client = client(&server);
    let assistant = client
        .create_assistant(
            &CreateAssistant::default()
                .set_name("Math Tutor")
                .add_tool(Tool::CodeInterpreter),
        )
        .await
        .unwrap();
    assert_eq!(assistant.id, "asst_1");

    let thread = client.create_thread().await.unwrap();
    assert_eq!(thread.id, "thread_1");

    let message = client
        .create_message(&thread.id, &CreateMessage::user("Solve this problem: 3x + 11 = 14"))
        .await
        .unwrap();
    assert_eq!(message.role, MessageRole::User);
}

#[tokio::test]
async fn test_file_upload_waits_for_processing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(header("Authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_body("uploaded")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/file-abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_body("uploaded")))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/file-abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_body("processed")))
        .mount(&server)
        .await;

    let mut book = tempfile::NamedTempFile::new().unwrap();
    book.write_all(b"%PDF-1.4 social structure").unwrap();

    let clock = Arc::new(ManualClock::new());
    let poller = JobPoller::new(
        FileUploads::new(client(&server)),
        PollStrategy::new(Duration::from_secs(5)),
    )
    .with_clock(clock.clone());

    let outcome = poller.run(&FileUpload::new(book.path())).await.unwrap();

    assert_eq!(outcome.status, TerminalStatus::Completed);
    assert_eq!(outcome.items.unwrap()[0].id, "file-abc123");
    assert_eq!(clock.sleeps().len(), 2);
}

#[tokio::test]
async fn test_chat_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_partial_json(json!({"model": "gpt-3.5-turbo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "gpt-3.5-turbo-0613",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "A function that calls itself..."
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 39,
                "completion_tokens": 6,
                "total_tokens": 45
            }
        })))
        .mount(&server)
        .await;

    let chat = Chat::default()
        .set_primer("You are a poetic assistant.")
        .add_message("Compose a poem that explains the concept of recursion in programming.");
    let response = client(&server).chat_completion(&chat).await.unwrap();

    let message = response.first_message().unwrap();
    assert_eq!(message.role, MessageRole::Assistant);
    assert_eq!(message.content.as_deref(), Some("A function that calls itself..."));
    assert_eq!(response.usage.unwrap().total_tokens, 45);
}
