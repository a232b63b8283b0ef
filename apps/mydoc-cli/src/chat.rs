//! Line-oriented prompt for `mydoc chat`.
use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, Lines};

#[derive(Debug, PartialEq, Eq)]
pub enum ChatInput {
    Question(String),
    Exit,
}

/// Prompt on `out` and wait for the next non-blank line. End of input,
/// `exit`/`quit`, or `interrupt` resolving before a line arrives all end the
/// session.
pub async fn next_question<R, W, F>(lines: &mut Lines<R>, out: &mut W, interrupt: F) -> std::io::Result<ChatInput>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    loop {
        out.write_all(b"\n> ").await?;
        out.flush().await?;
        let line = tokio::select! {
            line = lines.next_line() => line?,
            () = &mut interrupt => return Ok(ChatInput::Exit),
        };
        let Some(line) = line else { return Ok(ChatInput::Exit) };
        let question = line.trim();
        if question.is_empty() { continue; }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            return Ok(ChatInput::Exit);
        }
        return Ok(ChatInput::Question(question.to_string()));
    }
}
