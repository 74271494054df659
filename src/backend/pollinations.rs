//! Pollinations client: one signed GET per image

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, Url};
use tracing::debug;

use crate::backend::traits::{GenerationRequest, ImageProvider};
use crate::config::PollinationsConfig;
use crate::error::{AppError, Result};

pub const PROVIDER_NAME: &str = "Pollinations.ai";

/// Primary provider; the whole request fits in the URL
pub struct PollinationsProvider {
    client: Client,
    base_url: Url,
    referer: String,
    seed_min: u32,
    seed_max: u32,
}

impl PollinationsProvider {
    /// Create a new provider from configuration
    pub fn new(config: &PollinationsConfig) -> Result<Self> {
        if config.seed_min > config.seed_max {
            return Err(AppError::Internal(format!(
                "Invalid Pollinations seed range {}..={}",
                config.seed_min, config.seed_max
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::Internal(format!("Invalid Pollinations base URL '{}': {}", config.base_url, e))
        })?;

        Ok(Self {
            client,
            base_url,
            referer: config.referer.clone(),
            seed_min: config.seed_min,
            seed_max: config.seed_max,
        })
    }

    /// Build the image URL; the prompt becomes the last, percent-encoded path segment
    pub fn build_url(&self, request: &GenerationRequest, seed: u32) -> Result<Url> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Pollinations base URL is not hierarchical".to_string()))?
            .pop_if_empty()
            .push(&request.prompt);

        url.query_pairs_mut()
            .append_pair("width", &request.width.to_string())
            .append_pair("height", &request.height.to_string())
            .append_pair("model", request.model.as_str())
            .append_pair("nologo", "true")
            .append_pair("seed", &seed.to_string())
            .append_pair("private", "true")
            .append_pair("enhance", "true")
            .append_pair("referer", &self.referer);

        Ok(url)
    }

    fn random_seed(&self) -> u32 {
        rand::thread_rng().gen_range(self.seed_min..=self.seed_max)
    }
}

#[async_trait]
impl ImageProvider for PollinationsProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn try_generate(&self, request: &GenerationRequest) -> Result<Vec<u8>> {
        let seed = self.random_seed();
        let url = self.build_url(request, seed)?;

        debug!(provider = PROVIDER_NAME, seed = seed, model = %request.model, "Requesting image");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                service: PROVIDER_NAME.to_string(),
                status,
                body,
            });
        }

        let bytes = response.bytes().await?;
        debug!(provider = PROVIDER_NAME, size = bytes.len(), "Image received");
        Ok(bytes.to_vec())
    }
}
