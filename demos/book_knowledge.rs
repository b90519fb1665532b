mod common;

use std::time::Duration;

use aipoll::openai::{
    AssistantRuns, CreateAssistant, CreateMessage, CreateRun, FileUpload, FileUploads,
    OpenAIClient, Tool,
};
use aipoll::poller::{JobPoller, PollStrategy, TerminalStatus};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    common::init();
    let client = OpenAIClient::from_env()?;
    let book = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "THE_SOCIAL_STRUCTURE_OF_CATALONIA.pdf".to_string());

    // Wait for the upload to be processed before the assistant may use it.
    let uploads = JobPoller::new(
        FileUploads::new(client.clone()),
        PollStrategy::from_env(Duration::from_secs(5)),
    );
    let upload = uploads.run(&FileUpload::new(&book)).await?;
    let file = match upload.items.and_then(|files| files.into_iter().next()) {
        Some(file) => file,
        None => return Err(format!("processing of {} failed", book).into()),
    };

    let assistant = client
        .create_assistant(
            &CreateAssistant::default()
                .set_name("Get Book Knowledge")
                .set_instructions(
                    "You are a historian. Answer questions on the 'The Social Structure of Catalonia' by using the book which was published in 1984.",
                )
                .add_tool(Tool::Retrieval)
                .add_file(&file.id),
        )
        .await?;

    let thread = client.create_thread().await?;
    client
        .create_message(
            &thread.id,
            &CreateMessage::user("Explain the rise of catalan capitalism."),
        )
        .await?;

    let runs = JobPoller::new(
        AssistantRuns::new(client, &thread.id),
        PollStrategy::from_env(Duration::from_secs(5)),
    );
    let run = runs.submit(&CreateRun::new(&assistant.id)).await?;

    match runs.await_completion(&run.id).await? {
        TerminalStatus::Completed => {
            println!("\n\n### Messages ###");
            for (number, message) in runs.fetch_result(&run.id).await?.iter().enumerate() {
                println!("Message #{} = {}\n\n", number + 1, message);
            }
            Ok(())
        }
        TerminalStatus::Failed => Err(format!("run {} failed", run.id).into()),
    }
}
