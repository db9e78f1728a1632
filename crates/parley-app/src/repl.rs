//! Terminal chat loop.

use chrono::{DateTime, Local, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};

use parley_chat::{ChatError, ResponsePipeline};
use parley_core::log::ConversationStore;
use parley_core::types::Message;

/// `[03:04 PM] author: text`
pub fn render_line(message: &Message) -> String {
    format!(
        "[{}] {}: {}",
        short_time(&message.timestamp),
        message.author,
        message.text
    )
}

fn short_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%I:%M %p").to_string()
}

/// What a line of input asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Skip,
    Quit,
    Clear,
    Say(&'a str),
}

pub fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        "/quit" | "/exit" => Input::Quit,
        "/clear" => Input::Clear,
        text => Input::Say(text),
    }
}

/// Read utterances from stdin until EOF or `/quit`.
pub async fn run(
    pipeline: &ResponsePipeline,
    store: &dyn ConversationStore,
    author: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    pipeline.start_session(store)?;
    for message in store.all()? {
        println!("{}", render_line(&message));
    }
    println!("(type /clear to reset, /quit to leave)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Skip => continue,
            Input::Quit => break,
            Input::Clear => {
                store.clear()?;
                println!("Conversation cleared.");
                if let Some(welcome) = pipeline.start_session(store)? {
                    println!("{}", render_line(&welcome));
                }
            }
            Input::Say(text) => match pipeline.respond(store, author, text).await {
                Ok(exchange) => println!("{}", render_line(&exchange.reply)),
                Err(e @ ChatError::MessageTooLong(_)) => println!("! {}", e),
                Err(e) => return Err(e.into()),
            },
        }
    }

    tracing::debug!("Chat session ended");
    Ok(())
}
