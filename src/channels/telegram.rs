//! Telegram channel: long-polls the Bot API for updates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};

use crate::channels::{
    Attachment, Channel, IncomingMessage, MessageStream, OutgoingResponse, StatusUpdate,
};
use crate::config::TelegramConfig;
use crate::error::ChannelError;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// Long-poll timeout passed to getUpdates, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Back-off after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Telegram channel: connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    allowed_users: Vec<String>,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            bot_token: config.bot_token,
            allowed_users: config.allowed_users,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        api_url(&self.bot_token, method)
    }

    /// Send a plain-text message, split to fit Telegram's length limit.
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), ChannelError> {
        for chunk in split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH) {
            let resp = self
                .client
                .post(self.api_url("sendMessage"))
                .json(&serde_json::json!({
                    "chat_id": chat_id,
                    "text": chunk,
                }))
                .send()
                .await
                .map_err(|e| ChannelError::SendFailed {
                    name: "telegram".into(),
                    reason: e.to_string(),
                })?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(ChannelError::SendFailed {
                    name: "telegram".into(),
                    reason: format!("sendMessage returned {status}: {body}"),
                });
            }
        }
        Ok(())
    }

    /// Send a document from bytes (in-memory).
    pub async fn send_document_bytes(
        &self,
        chat_id: &str,
        file_bytes: Vec<u8>,
        file_name: &str,
        mime_type: &str,
        caption: Option<&str>,
    ) -> anyhow::Result<()> {
        let part = Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        if let Some(cap) = caption {
            form = form.text("caption", cap.to_string());
        }

        let resp = self
            .client
            .post(self.api_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = resp.text().await?;
            anyhow::bail!("Telegram sendDocument failed: {err}");
        }

        tracing::info!("Telegram document sent to {chat_id}: {file_name}");
        Ok(())
    }

    async fn send_attachment(
        &self,
        chat_id: &str,
        attachment: Attachment,
    ) -> Result<(), ChannelError> {
        self.send_document_bytes(
            chat_id,
            attachment.bytes,
            &attachment.file_name,
            &attachment.mime_type,
            attachment.caption.as_deref(),
        )
        .await
        .map_err(|e| ChannelError::SendFailed {
            name: "telegram".into(),
            reason: e.to_string(),
        })
    }
}

// ── Channel trait implementation ────────────────────────────────────

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let allowed_users = self.allowed_users.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for messages...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["message"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                };

                let results = match update_results(&data) {
                    Ok(results) => results,
                    Err(reason) => {
                        tracing::warn!("Telegram getUpdates failed: {reason}");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                };

                for update in results {
                    // Advance offset past this update
                    if let Some(uid) = update.get("update_id").and_then(serde_json::Value::as_i64)
                    {
                        offset = uid + 1;
                    }

                    let Some(incoming) = parse_update(update, &allowed_users) else {
                        continue;
                    };

                    if tx.send(incoming).is_err() {
                        tracing::info!("Telegram listener channel closed");
                        return;
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let chat_id = msg
            .metadata
            .get("chat_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: "No chat_id in message metadata".into(),
            })?;

        if !response.content.is_empty() {
            self.send_message(chat_id, &response.content).await?;
        }
        for attachment in response.attachments {
            self.send_attachment(chat_id, attachment).await?;
        }
        Ok(())
    }

    /// Every status shows as the typing indicator.
    async fn send_status(
        &self,
        _status: StatusUpdate,
        metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        let Some(chat_id) = metadata.get("chat_id").and_then(|v| v.as_str()) else {
            return Ok(());
        };
        self.client
            .post(self.api_url("sendChatAction"))
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "action": "typing"
            }))
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram channel shutting down");
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn api_url(bot_token: &SecretString, method: &str) -> String {
    format!(
        "{TELEGRAM_API_BASE}/bot{}/{method}",
        bot_token.expose_secret()
    )
}

/// The `result` array of a `getUpdates` response, or why there is none.
///
/// Telegram answers `{"ok": false, "description": ...}` for a bad token or a
/// competing poller.
fn update_results(data: &serde_json::Value) -> Result<&[serde_json::Value], String> {
    if let Some(results) = data.get("result").and_then(serde_json::Value::as_array) {
        return Ok(results);
    }
    let description = data
        .get("description")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("response has no result");
    Err(match data.get("error_code").and_then(serde_json::Value::as_i64) {
        Some(code) => format!("{code}: {description}"),
        None => description.to_string(),
    })
}

/// Turn one `getUpdates` entry into an `IncomingMessage`.
///
/// Returns `None` for non-text updates and for senders outside the allow-list.
/// The numeric Telegram user id becomes the tracker's user id.
fn parse_update(update: &serde_json::Value, allowed_users: &[String]) -> Option<IncomingMessage> {
    let message = update.get("message")?;
    let text = message.get("text").and_then(serde_json::Value::as_str)?;

    let from = message.get("from");
    let username = from
        .and_then(|f| f.get("username"))
        .and_then(|u| u.as_str())
        .unwrap_or("unknown");
    let user_id = from
        .and_then(|f| f.get("id"))
        .and_then(serde_json::Value::as_i64)
        .map(|id| id.to_string());

    let mut identities = vec![username];
    if let Some(ref id) = user_id {
        identities.push(id.as_str());
    }
    if !check_user_allowed(allowed_users, identities) {
        tracing::warn!(
            "Telegram: ignoring message from unauthorized user: \
             username={username}, user_id={}",
            user_id.as_deref().unwrap_or("unknown")
        );
        return None;
    }

    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(serde_json::Value::as_i64)
        .map(|id| id.to_string())
        .unwrap_or_default();

    let first_name = from
        .and_then(|f| f.get("first_name"))
        .and_then(|n| n.as_str());

    let incoming = IncomingMessage::new(
        "telegram",
        user_id.as_deref().unwrap_or(username),
        text,
    )
    .with_metadata(serde_json::json!({
        "chat_id": chat_id,
        "username": username,
    }))
    .with_user_name(first_name.unwrap_or(username));

    Some(incoming)
}

/// Check if any identity in the iterator matches the allowed users list.
fn check_user_allowed<'a>(
    allowed_users: &[String],
    identities: impl IntoIterator<Item = &'a str>,
) -> bool {
    let ids: Vec<&str> = identities.into_iter().collect();
    allowed_users
        .iter()
        .any(|u| u == "*" || ids.contains(&u.as_str()))
}

/// Split a message into chunks that fit Telegram's character limit.
/// Tries to split on newlines, then spaces, then hard-cuts on a char boundary.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        let mut boundary = max_len;
        while !remaining.is_char_boundary(boundary) {
            boundary -= 1;
        }
        let chunk = &remaining[..boundary];
        let split_at = chunk
            .rfind('\n')
            .or_else(|| chunk.rfind(' '))
            .filter(|&i| i > 0)
            .unwrap_or(boundary);

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(allowed: &[&str]) -> TelegramChannel {
        TelegramChannel::new(TelegramConfig {
            bot_token: SecretString::from("123:ABC".to_string()),
            allowed_users: allowed.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn update(user_id: i64, username: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "update_id": 7,
            "message": {
                "message_id": 1,
                "from": {"id": user_id, "username": username, "first_name": "Sam"},
                "chat": {"id": 555, "type": "private"},
                "text": text
            }
        })
    }

    #[test]
    fn telegram_channel_name() {
        assert_eq!(channel(&["*"]).name(), "telegram");
    }

    #[test]
    fn telegram_api_url() {
        assert_eq!(
            channel(&[]).api_url("getMe"),
            "https://api.telegram.org/bot123:ABC/getMe"
        );
    }

    // ── User allowlist tests ────────────────────────────────────────

    fn allowed(list: &[&str], identities: &[&str]) -> bool {
        let list: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        check_user_allowed(&list, identities.iter().copied())
    }

    #[test]
    fn telegram_user_allowed_wildcard() {
        assert!(allowed(&["*"], &["anyone"]));
    }

    #[test]
    fn telegram_user_allowed_specific() {
        assert!(allowed(&["alice", "bob"], &["alice"]));
        assert!(!allowed(&["alice", "bob"], &["eve"]));
    }

    #[test]
    fn telegram_user_denied_empty() {
        assert!(!allowed(&[], &["anyone"]));
    }

    #[test]
    fn telegram_user_exact_match_not_substring() {
        assert!(!allowed(&["alice"], &["alice_bot"]));
        assert!(!allowed(&["alice"], &["malice"]));
    }

    #[test]
    fn telegram_user_allowed_by_numeric_id_identity() {
        assert!(allowed(&["123456789"], &["unknown", "123456789"]));
        assert!(!allowed(&["123456789"], &["unknown", "987"]));
    }

    // ── getUpdates responses ────────────────────────────────────────

    #[test]
    fn update_results_reads_result_array() {
        let data = serde_json::json!({"ok": true, "result": [{"update_id": 1}]});
        assert_eq!(update_results(&data).unwrap().len(), 1);

        let empty = serde_json::json!({"ok": true, "result": []});
        assert!(update_results(&empty).unwrap().is_empty());
    }

    #[test]
    fn update_results_reports_api_errors() {
        let unauthorized = serde_json::json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        });
        assert_eq!(update_results(&unauthorized).unwrap_err(), "401: Unauthorized");

        let bare = serde_json::json!({"ok": false});
        assert_eq!(update_results(&bare).unwrap_err(), "response has no result");
    }

    // ── Update parsing ──────────────────────────────────────────────

    #[test]
    fn parse_update_uses_numeric_id_and_chat() {
        let incoming = parse_update(&update(42, "sam", "/log_water 250"), &["*".into()]).unwrap();
        assert_eq!(incoming.channel, "telegram");
        assert_eq!(incoming.user_id, "42");
        assert_eq!(incoming.content, "/log_water 250");
        assert_eq!(incoming.metadata["chat_id"], "555");
        assert_eq!(incoming.user_name.as_deref(), Some("Sam"));
    }

    #[test]
    fn parse_update_skips_unauthorized_and_non_text() {
        assert!(parse_update(&update(42, "sam", "hi"), &["alice".into()]).is_none());

        let sticker = serde_json::json!({
            "update_id": 8,
            "message": {"from": {"id": 42}, "chat": {"id": 555}, "sticker": {}}
        });
        assert!(parse_update(&sticker, &["*".into()]).is_none());
    }

    // ── Network error tests (expected to fail with no server) ───────

    #[tokio::test]
    async fn telegram_send_document_bytes_fails_without_server() {
        let ch = TelegramChannel::new(TelegramConfig {
            bot_token: SecretString::from("fake-token".to_string()),
            allowed_users: vec!["*".into()],
        });
        let result = ch
            .send_document_bytes("123456", b"<svg/>".to_vec(), "water.svg", "image/svg+xml", None)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn respond_without_chat_id_is_an_error() {
        let msg = IncomingMessage::new("telegram", "42", "hello");
        let err = channel(&["*"])
            .respond(&msg, OutgoingResponse::text("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::SendFailed { .. }));
    }

    // ── Message splitting tests ─────────────────────────────────────

    #[test]
    fn split_message_short() {
        assert_eq!(split_message("Hello", 4096), vec!["Hello"]);
    }

    #[test]
    fn split_message_over_limit_on_newline() {
        let msg = format!("{}\n{}", "a".repeat(2000), "b".repeat(3000));
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks, vec!["a".repeat(2000), "b".repeat(3000)]);
    }

    #[test]
    fn split_message_no_good_split_point() {
        let msg = "a".repeat(5000);
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 904);
    }

    #[test]
    fn split_message_respects_char_boundaries() {
        let msg = "é".repeat(3000); // 6000 bytes
        let chunks = split_message(&msg, 4095);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() <= 4095));
        assert_eq!(chunks.concat(), msg);
    }
}
