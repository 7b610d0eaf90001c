//! Terminal input plumbing for the interactive loop.
//!
//! Stdin is read on a dedicated blocking thread and fed through a channel,
//! so the session loop can wait on either the next line or Ctrl-C. An
//! interrupt at the input boundary resumes the loop; EOF ends the session.

use anyhow::Result;
use async_trait::async_trait;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;

use crate::router::Confirm;

/// One event from the interactive input stream.
pub enum LineEvent {
    Line(String),
    Eof,
    Interrupted,
}

/// Channel-backed line reader over stdin.
pub struct LineReader {
    rx: mpsc::Receiver<String>,
}

impl LineReader {
    /// Start the stdin feeder thread and return the reader.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel(1);

        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            let mut locked = stdin.lock();
            let mut line = String::new();
            loop {
                line.clear();
                match locked.read_line(&mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        let stripped =
                            line.trim_end_matches(|c| c == '\r' || c == '\n').to_string();
                        if tx.blocking_send(stripped).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx }
    }

    /// Wait for the next line, EOF, or Ctrl-C, whichever comes first.
    pub async fn next_line(&mut self) -> LineEvent {
        tokio::select! {
            line = self.rx.recv() => match line {
                Some(l) => LineEvent::Line(l),
                None => LineEvent::Eof,
            },
            _ = tokio::signal::ctrl_c() => LineEvent::Interrupted,
        }
    }
}

#[async_trait]
impl Confirm for LineReader {
    async fn confirm(&mut self, prompt: &str) -> Result<bool> {
        print!("{} (y/n): ", prompt);
        std::io::stdout().flush()?;

        match self.next_line().await {
            LineEvent::Line(line) => Ok(line.trim().eq_ignore_ascii_case("y")),
            LineEvent::Eof | LineEvent::Interrupted => Ok(false),
        }
    }
}
