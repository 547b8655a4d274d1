//! Channel trait and the message types that flow through it.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::error::ChannelError;

/// A message received from a user on some channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Name of the channel that received it.
    pub channel: String,
    /// Stable per-user identifier on that channel.
    pub user_id: String,
    pub user_name: Option<String>,
    pub content: String,
    pub received_at: DateTime<Utc>,
    /// Channel-specific routing data (e.g. Telegram `chat_id`).
    pub metadata: serde_json::Value,
}

impl IncomingMessage {
    pub fn new(
        channel: impl Into<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            user_id: user_id.into(),
            user_name: None,
            content: content.into(),
            received_at: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }
}

/// A file sent alongside a response, e.g. a rendered chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub caption: Option<String>,
    pub bytes: Vec<u8>,
}

/// A response to send back on the originating channel.
#[derive(Debug, Clone, Default)]
pub struct OutgoingResponse {
    pub content: String,
    pub attachments: Vec<Attachment>,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Progress hints shown while a message is being handled.
#[derive(Debug, Clone)]
pub enum StatusUpdate {
    /// Waiting on a slow operation such as an external lookup.
    Thinking(String),
}

pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A bidirectional message transport.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start listening; the stream yields messages until the channel closes.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    async fn send_status(
        &self,
        _status: StatusUpdate,
        _metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_message_builders() {
        let msg = IncomingMessage::new("telegram", "42", "/start")
            .with_metadata(serde_json::json!({"chat_id": "42"}))
            .with_user_name("Sam");
        assert_eq!(msg.channel, "telegram");
        assert_eq!(msg.user_id, "42");
        assert_eq!(msg.user_name.as_deref(), Some("Sam"));
        assert_eq!(msg.metadata["chat_id"], "42");
    }

    #[test]
    fn outgoing_response_collects_attachments() {
        let response = OutgoingResponse::text("charts").with_attachment(Attachment {
            file_name: "water.svg".into(),
            mime_type: "image/svg+xml".into(),
            caption: None,
            bytes: b"<svg/>".to_vec(),
        });
        assert_eq!(response.content, "charts");
        assert_eq!(response.attachments.len(), 1);
    }
}
