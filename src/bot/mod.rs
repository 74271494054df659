//! Bot module - Telegram client, command parsing, and handlers

pub mod command;
pub mod handler;
pub mod telegram;

pub use handler::Bot;
