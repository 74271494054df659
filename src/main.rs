//! Main entry point for the image generation bot

use imagegen_bot::{
    bot::{telegram::TelegramClient, Bot},
    config::Settings,
    gateway::FallbackChain,
    logging,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    // Initialize logging
    logging::init(&settings.logging);

    info!(
        max_prompt_length = settings.generation.max_prompt_length,
        poll_attempts = settings.arta.max_poll_attempts,
        "Starting image generation bot"
    );

    let generator = Arc::new(FallbackChain::from_settings(&settings)?);
    let telegram = Arc::new(TelegramClient::new(&settings.telegram)?);
    let bot = Arc::new(Bot::new(telegram, generator, &settings));

    tokio::select! {
        result = bot.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
