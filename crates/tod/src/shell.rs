//! Interactive Shell
//!
//! Reads one line at a time, runs it through the orchestrator and prints
//! the answer. A failed turn is reported and the loop carries on with the
//! conversation as it stood.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tod_core::{Conversation, Orchestrator};

pub const PROMPT: &str = "> ";

/// Run the read-eval-print loop until `input` is exhausted.
///
/// Answers go to `out`, turn failures to `err`. Returns the conversation so
/// far.
pub async fn run<R, O, E>(
    orchestrator: &Orchestrator,
    input: R,
    out: &mut O,
    err: &mut E,
) -> anyhow::Result<Conversation>
where
    R: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let mut conversation = orchestrator.new_conversation();
    let mut lines = input.lines();

    loop {
        out.write_all(PROMPT.as_bytes()).await?;
        out.flush().await?;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                out.write_all(b"\n").await?;
                out.flush().await?;
                break;
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(error = %e, "Skipping unreadable input line");
                err.write_all(b"That line is not valid UTF-8 text, please retype it.\n")
                    .await?;
                err.flush().await?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        match orchestrator.turn(&mut conversation, query).await {
            Ok(outcome) => {
                out.write_all(outcome.answer.as_bytes()).await?;
                out.write_all(b"\n").await?;
            }
            Err(e) => {
                tracing::error!(error = %e, retryable = e.is_retryable(), "Turn failed");
                err.write_all(e.user_message().as_bytes()).await?;
                if e.is_retryable() {
                    err.write_all(b" Please try again.").await?;
                }
                err.write_all(b"\n").await?;
                err.flush().await?;
            }
        }
    }

    Ok(conversation)
}
