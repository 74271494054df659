//! Configuration module - layered settings loaded at startup

pub mod settings;

pub use settings::{
    ArtaConfig, BotConfig, GenerationConfig, LoggingConfig, PollinationsConfig, Settings,
    TelegramConfig,
};
