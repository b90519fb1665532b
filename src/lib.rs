//! aipoll
//!
//! Submit asynchronous jobs to a hosted AI API and wait for them with a
//! fixed-interval poller.
//!
//! - [`poller`]: the provider-agnostic [`JobPoller`](poller::JobPoller),
//!   its [`PollStrategy`](poller::PollStrategy) and the [`JobApi`](poller::JobApi)
//!   seam it drives
//! - [`openai`]: an explicit [`OpenAIClient`](openai::OpenAIClient) for
//!   assistants, threads, runs, files and chat completions, plus the
//!   `JobApi` adapters for runs and file processing
//! - [`config`]: credentials, read once at startup
//!
//! # Example
//!
//! ```no_run
//! use aipoll::openai::{AssistantRuns, CreateAssistant, CreateMessage, CreateRun, OpenAIClient, Tool};
//! use aipoll::poller::{JobPoller, PollStrategy};
//!
//! #[tokio::main]
//! async fn main() -> aipoll::Result<()> {
//!     let client = OpenAIClient::from_env()?;
//!     let assistant = client
//!         .create_assistant(&CreateAssistant::default().add_tool(Tool::CodeInterpreter))
//!         .await?;
//!     let thread = client.create_thread().await?;
//!     client
//!         .create_message(&thread.id, &CreateMessage::user("Solve this problem: 3x + 11 = 14"))
//!         .await?;
//!
//!     let poller = JobPoller::new(AssistantRuns::new(client, &thread.id), PollStrategy::default());
//!     let outcome = poller.run(&CreateRun::new(&assistant.id)).await?;
//!     for message in outcome.items.unwrap_or_default() {
//!         println!("{}", message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod openai;
pub mod poller;

pub use error::{Error, Result};
