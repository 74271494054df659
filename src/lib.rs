//! Image Generation Bot
//!
//! A Telegram bot that turns text prompts into images, trying a fast
//! URL-based provider first and falling back to a token/polling provider.

pub mod backend;
pub mod bot;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;

pub use error::{AppError, Result};
