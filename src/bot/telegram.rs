//! Minimal Telegram Bot API client over reqwest

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::config::TelegramConfig;
use crate::error::{AppError, Result};

pub const PARSE_MODE_MARKDOWN: &str = "Markdown";

/// Incoming update; only plain messages are requested
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Body of `sendMessage`
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,
}

impl SendMessage {
    /// Plain-text reply to `message`
    pub fn reply(message: &Message, text: impl Into<String>) -> Self {
        Self {
            chat_id: message.chat.id,
            text: text.into(),
            reply_to_message_id: Some(message.message_id),
            ..Default::default()
        }
    }

    pub fn markdown(mut self) -> Self {
        self.parse_mode = Some(PARSE_MODE_MARKDOWN);
        self
    }

    pub fn without_preview(mut self) -> Self {
        self.disable_web_page_preview = Some(true);
        self
    }
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API client bound to one bot token
pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    /// Create a new client from configuration
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        // Long polls hold the connection open for the whole poll timeout
        let client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: format!(
                "{}/bot{}",
                config.api_base.trim_end_matches('/'),
                config.bot_token
            ),
            poll_timeout_secs: config.poll_timeout_secs,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &impl Serialize) -> Result<T> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        read_result(method, response).await
    }

    /// Long-poll for updates newer than `offset`
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &body).await
    }

    pub async fn send_message(&self, message: &SendMessage) -> Result<Message> {
        self.call("sendMessage", message).await
    }

    pub async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        let body = json!({ "chat_id": chat_id, "message_id": message_id, "text": text });
        let _: serde_json::Value = self.call("editMessageText", &body).await?;
        Ok(())
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        let body = json!({ "chat_id": chat_id, "message_id": message_id });
        let _: bool = self.call("deleteMessage", &body).await?;
        Ok(())
    }

    /// Register the command list shown in the client's suggestions
    pub async fn set_my_commands(&self, commands: &[(&str, &str)]) -> Result<()> {
        let commands: Vec<_> = commands
            .iter()
            .map(|(command, description)| json!({ "command": command, "description": description }))
            .collect();
        let _: bool = self
            .call("setMyCommands", &json!({ "commands": commands }))
            .await?;
        Ok(())
    }

    /// Upload raw image bytes as a photo with a Markdown caption
    pub async fn send_photo(
        &self,
        chat_id: i64,
        image: Vec<u8>,
        caption: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<Message> {
        let size = image.len();
        let photo = Part::bytes(image).file_name("image.png");

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .text("parse_mode", PARSE_MODE_MARKDOWN)
            .part("photo", photo);
        if let Some(id) = reply_to_message_id {
            form = form.text("reply_to_message_id", id.to_string());
        }

        debug!(chat_id = chat_id, size = size, "Uploading photo");

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        read_result("sendPhoto", response).await
    }
}

async fn read_result<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    let parsed: ApiResponse<T> = match serde_json::from_slice(&bytes) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            return Err(AppError::Upstream {
                service: format!("Telegram {}", method),
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Err(e) => return Err(AppError::Json(e)),
    };

    if !parsed.ok {
        return Err(AppError::Telegram(format!(
            "{} failed: {}",
            method,
            parsed.description.unwrap_or_else(|| status.to_string())
        )));
    }

    parsed
        .result
        .ok_or_else(|| AppError::Telegram(format!("{} returned no result", method)))
}
