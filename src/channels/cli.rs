//! CLI channel: stdin/stdout REPL for local use.

use std::path::PathBuf;

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse, StatusUpdate};
use crate::error::ChannelError;

/// User id for everything typed into the terminal.
pub const CLI_USER_ID: &str = "local-user";

/// Reads lines from stdin, prints responses to stdout and saves attachments
/// into `attachment_dir`.
pub struct CliChannel {
    attachment_dir: PathBuf,
}

impl CliChannel {
    pub fn new() -> Self {
        Self::with_attachment_dir(std::env::temp_dir())
    }

    pub fn with_attachment_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            attachment_dir: dir.into(),
        }
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        let msg = IncomingMessage::new("cli", CLI_USER_ID, &line);
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        println!("\n{}\n", response.content);
        for attachment in response.attachments {
            let path = self.attachment_dir.join(&attachment.file_name);
            tokio::fs::write(&path, &attachment.bytes)
                .await
                .map_err(|e| ChannelError::SendFailed {
                    name: "cli".into(),
                    reason: format!("could not write {}: {e}", path.display()),
                })?;
            println!("📎 {} saved to {}", attachment.file_name, path.display());
        }
        eprint!("> ");
        Ok(())
    }

    async fn send_status(
        &self,
        status: StatusUpdate,
        _metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        let StatusUpdate::Thinking(msg) = status;
        eprintln!("⏳ {}", msg);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::Attachment;

    #[tokio::test]
    async fn attachments_are_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let channel = CliChannel::with_attachment_dir(dir.path());
        let msg = IncomingMessage::new("cli", CLI_USER_ID, "/show_graphs");
        let response = OutgoingResponse::text("Your charts").with_attachment(Attachment {
            file_name: "water.svg".into(),
            mime_type: "image/svg+xml".into(),
            caption: None,
            bytes: b"<svg/>".to_vec(),
        });
        channel.respond(&msg, response).await.unwrap();

        let written = tokio::fs::read(dir.path().join("water.svg")).await.unwrap();
        assert_eq!(written, b"<svg/>");
    }

    #[tokio::test]
    async fn unwritable_directory_is_a_send_failure() {
        let channel = CliChannel::with_attachment_dir("/nonexistent/hydrafit/charts");
        let msg = IncomingMessage::new("cli", CLI_USER_ID, "/show_graphs");
        let response = OutgoingResponse::text("x").with_attachment(Attachment {
            file_name: "water.svg".into(),
            mime_type: "image/svg+xml".into(),
            caption: None,
            bytes: vec![],
        });
        let err = channel.respond(&msg, response).await.unwrap_err();
        assert!(matches!(err, ChannelError::SendFailed { .. }));
    }
}
