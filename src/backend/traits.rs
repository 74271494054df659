//! Common traits and types for image generation providers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::{AppError, Result};

/// Image style/model understood by both providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Model {
    #[default]
    Flux,
    StableDiffusion,
    DallE,
    Glide,
}

impl Model {
    pub const ALL: [Model; 4] = [Model::Flux, Model::StableDiffusion, Model::DallE, Model::Glide];

    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Flux => "flux",
            Model::StableDiffusion => "stable-diffusion",
            Model::DallE => "dall-e",
            Model::Glide => "glide",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        Model::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| AppError::Validation(format!("Unknown model '{}'", s)))
    }
}

/// Request to generate a single image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The prompt to generate the image from
    pub prompt: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    pub model: Model,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, width: u32, height: u32, model: Model) -> Self {
        Self {
            prompt: prompt.into(),
            width,
            height,
            model,
        }
    }

    /// Check the request against the prompt limit before any provider sees it
    pub fn validate(&self, max_prompt_length: usize) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(AppError::Validation(
                "Please provide a text prompt to generate an image".to_string(),
            ));
        }

        if self.prompt.chars().count() > max_prompt_length {
            return Err(AppError::Validation(format!(
                "Prompt is too long. Maximum {} characters allowed.",
                max_prompt_length
            )));
        }

        if self.width == 0 || self.height == 0 {
            return Err(AppError::Validation(
                "Width and height must be positive numbers".to_string(),
            ));
        }

        Ok(())
    }
}

/// Trait for text-to-image providers
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Provider label reported back to the user
    fn name(&self) -> &str;

    /// Run the provider protocol, surfacing the precise failure
    async fn try_generate(&self, request: &GenerationRequest) -> Result<Vec<u8>>;

    /// Run the provider and collapse every failure into `None`
    async fn generate(&self, request: &GenerationRequest) -> Option<Vec<u8>> {
        match self.try_generate(request).await {
            Ok(image) if image.is_empty() => {
                warn!(provider = %self.name(), "Provider returned an empty image");
                None
            }
            Ok(image) => Some(image),
            Err(e) => {
                warn!(provider = %self.name(), error = %e, "Provider failed");
                None
            }
        }
    }
}
