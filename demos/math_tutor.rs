mod common;

use std::time::Duration;

use aipoll::openai::{AssistantRuns, CreateAssistant, CreateMessage, CreateRun, OpenAIClient, Tool};
use aipoll::poller::{JobPoller, PollStrategy, TerminalStatus};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    common::init();
    let client = OpenAIClient::from_env()?;

    let assistant = client
        .create_assistant(
            &CreateAssistant::default()
                .set_name("Math Tutor")
                .set_instructions(
                    "You are a personal math tutor. Write and run code to answer math questions.",
                )
                .add_tool(Tool::CodeInterpreter),
        )
        .await?;

    let thread = client.create_thread().await?;
    client
        .create_message(&thread.id, &CreateMessage::user("Solve this problem: 3x + 11 = 14"))
        .await?;

    let poller = JobPoller::new(
        AssistantRuns::new(client, &thread.id),
        PollStrategy::from_env(Duration::from_secs(1)),
    );
    let run = poller.submit(&CreateRun::new(&assistant.id)).await?;

    match poller.await_completion(&run.id).await? {
        TerminalStatus::Completed => {
            println!("\n\n### Messages ###");
            for message in poller.fetch_result(&run.id).await? {
                println!("{}", message);
            }
            Ok(())
        }
        TerminalStatus::Failed => Err(format!("run {} failed", run.id).into()),
    }
}
