mod common;

use aipoll::openai::{Chat, OpenAIClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    common::init();
    let client = OpenAIClient::from_env()?;

    let chat = Chat::default()
        .set_primer(
            "You are a poetic assistant, skilled in explaining complex programming concepts with creative flair.",
        )
        .add_message("Compose a poem that explains the concept of recursion in programming.");

    let response = client.chat_completion(&chat).await?;
    match response.first_message() {
        Some(message) => println!("{}", message),
        None => return Err("the model returned no choices".into()),
    }
    Ok(())
}
