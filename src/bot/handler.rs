//! Update loop and command handlers

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::backend::traits::{GenerationRequest, Model};
use crate::bot::command::{parse_image_args, Command};
use crate::bot::telegram::{Message, SendMessage, TelegramClient};
use crate::config::{GenerationConfig, Settings};
use crate::error::Result;
use crate::gateway::fallback::{FallbackChain, FallbackObserver};

/// Commands advertised through `setMyCommands`
pub const COMMANDS: [(&str, &str); 4] = [
    ("start", "Get started with the bot"),
    ("help", "How to use the bot"),
    ("admin", "About the bot creator"),
    ("img", "Generate AI images"),
];

pub const GENERATING_NOTICE: &str =
    "🖌️ Generating your image... Please wait (this may take a minute)";

pub const USAGE_HINT: &str =
    "Please provide a prompt. Example:\n`/img a cute cat`\n\nFor more options, type /help";

/// Telegram front-end around the generation chain
pub struct Bot {
    telegram: Arc<TelegramClient>,
    generator: Arc<FallbackChain>,
    generation: GenerationConfig,
    about_text: String,
    retry_delay: Duration,
}

impl Bot {
    pub fn new(
        telegram: Arc<TelegramClient>,
        generator: Arc<FallbackChain>,
        settings: &Settings,
    ) -> Self {
        Self {
            telegram,
            generator,
            generation: settings.generation.clone(),
            about_text: settings.bot.about_text.clone(),
            retry_delay: Duration::from_secs(settings.telegram.retry_delay_secs),
        }
    }

    /// Register commands, then long-poll forever, one task per message
    pub async fn run(self: Arc<Self>) -> Result<()> {
        self.telegram.set_my_commands(&COMMANDS).await?;
        info!("Bot is running");

        let mut offset: Option<i64> = None;
        loop {
            let updates = match self.telegram.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "Failed to fetch updates");
                    tokio::time::sleep(self.retry_delay).await;
                    continue;
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);

                if let Some(message) = update.message {
                    let bot = Arc::clone(&self);
                    tokio::spawn(async move {
                        bot.handle_message(message).await;
                    });
                }
            }
        }
    }

    /// Dispatch one incoming message; failures are reported back to the chat
    pub async fn handle_message(&self, message: Message) {
        let Some(command) = message.text.as_deref().and_then(Command::parse) else {
            return;
        };

        debug!(chat_id = message.chat.id, command = ?command, "Handling command");

        let result = match command {
            Command::Start | Command::Help => self.reply_markdown(&message, &welcome_text()).await,
            Command::Admin => {
                let reply = SendMessage::reply(&message, self.about_text.clone())
                    .markdown()
                    .without_preview();
                self.telegram.send_message(&reply).await.map(|_| ())
            }
            Command::Image(args) => self.handle_image(&message, &args).await,
        };

        if let Err(e) = result {
            warn!(chat_id = message.chat.id, error = %e, "Command failed");
            let reply = SendMessage::reply(&message, e.user_message());
            if let Err(e) = self.telegram.send_message(&reply).await {
                warn!(chat_id = message.chat.id, error = %e, "Failed to report error to chat");
            }
        }
    }

    async fn handle_image(&self, message: &Message, args: &str) -> Result<()> {
        if args.trim().is_empty() {
            return self.reply_markdown(message, USAGE_HINT).await;
        }

        let request = parse_image_args(args, &self.generation)?;
        self.generator.validate(&request)?;

        let chat_id = message.chat.id;
        let notice = self
            .telegram
            .send_message(&SendMessage::reply(message, GENERATING_NOTICE))
            .await?;

        let observer = NoticeUpdater {
            telegram: &self.telegram,
            chat_id,
            message_id: notice.message_id,
        };
        let outcome = self.generator.generate_with_observer(&request, &observer).await;

        if let Err(e) = self.telegram.delete_message(chat_id, notice.message_id).await {
            debug!(chat_id = chat_id, error = %e, "Could not delete progress notice");
        }

        let result = outcome?;
        let caption = format_caption(&request, &result.source);
        self.telegram
            .send_photo(chat_id, result.image, &caption, Some(message.message_id))
            .await?;

        info!(chat_id = chat_id, source = %result.source, "Image delivered");
        Ok(())
    }

    async fn reply_markdown(&self, message: &Message, text: &str) -> Result<()> {
        let reply = SendMessage::reply(message, text).markdown();
        self.telegram.send_message(&reply).await.map(|_| ())
    }
}

/// Rewrites the progress notice when the chain switches provider
struct NoticeUpdater<'a> {
    telegram: &'a TelegramClient,
    chat_id: i64,
    message_id: i64,
}

#[async_trait]
impl FallbackObserver for NoticeUpdater<'_> {
    async fn on_fallback(&self, failed: &str, next: &str) {
        let text = format!("🔄 {} failed, trying {}...", failed, next);
        if let Err(e) = self
            .telegram
            .edit_message_text(self.chat_id, self.message_id, &text)
            .await
        {
            debug!(chat_id = self.chat_id, error = %e, "Could not update progress notice");
        }
    }
}

pub fn welcome_text() -> String {
    let others: Vec<&str> = Model::ALL
        .iter()
        .filter(|m| **m != Model::default())
        .map(|m| m.as_str())
        .collect();

    format!(
        "🖼️ *AI Image Generator Bot*\n\n\
         *Available Commands:*\n\
         `/start` or `/help` - Show this help message\n\
         `/admin` - About the bot creator\n\
         `/img` - Generate AI images\n\n\
         ✨ *Image Generation Examples:*\n\
         • `/img a beautiful sunset over mountains`\n\
         • `/img 512 512 a cute puppy`\n\
         • `/img 1024 768 flux a futuristic cityscape`\n\n\
         📏 *Format:* `/img [width] [height] [model] [prompt]`\n\
         ⚙️ *Default Model:* {} (other options: {})",
        Model::default(),
        others.join(", ")
    )
}

pub fn format_caption(request: &GenerationRequest, source: &str) -> String {
    format!(
        "🎨 *Prompt:* {}\n📐 *Size:* {}x{}\n🤖 *Model:* {}\n⚡ *Source:* {}",
        escape_markdown(&request.prompt),
        request.width,
        request.height,
        escape_markdown(request.model.as_str()),
        escape_markdown(source)
    )
}

/// Escape the characters that legacy Markdown treats as entity delimiters
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
