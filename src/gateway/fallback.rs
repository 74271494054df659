//! Provider fallback: try the primary provider, then the fallback, then give up

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::backend::arta::ArtaProvider;
use crate::backend::pollinations::PollinationsProvider;
use crate::backend::traits::{GenerationRequest, ImageProvider};
use crate::config::Settings;
use crate::error::{AppError, Result};

/// A generated image and the provider that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub image: Vec<u8>,
    pub source: String,
}

/// Notified when the chain moves on to the next provider
#[async_trait]
pub trait FallbackObserver: Send + Sync {
    async fn on_fallback(&self, failed: &str, next: &str);
}

/// Observer that ignores provider switches
pub struct SilentObserver;

#[async_trait]
impl FallbackObserver for SilentObserver {
    async fn on_fallback(&self, _failed: &str, _next: &str) {}
}

/// Ordered provider chain; each request walks it at most once
pub struct FallbackChain {
    providers: Vec<Arc<dyn ImageProvider>>,
    max_prompt_length: usize,
}

impl FallbackChain {
    /// Create a chain that tries `primary` first and `fallback` second
    pub fn new(
        primary: Arc<dyn ImageProvider>,
        fallback: Arc<dyn ImageProvider>,
        max_prompt_length: usize,
    ) -> Self {
        Self {
            providers: vec![primary, fallback],
            max_prompt_length,
        }
    }

    /// Pollinations first, Arta second, both configured from `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let primary = Arc::new(PollinationsProvider::new(&settings.pollinations)?);
        let fallback = Arc::new(ArtaProvider::new(&settings.arta)?);

        Ok(Self::new(
            primary,
            fallback,
            settings.generation.max_prompt_length,
        ))
    }

    /// Reject requests that must never reach a provider
    pub fn validate(&self, request: &GenerationRequest) -> Result<()> {
        request.validate(self.max_prompt_length)
    }

    /// Generate an image without progress notifications
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.generate_with_observer(request, &SilentObserver).await
    }

    /// Generate an image, telling `observer` whenever a provider is abandoned
    pub async fn generate_with_observer(
        &self,
        request: &GenerationRequest,
        observer: &dyn FallbackObserver,
    ) -> Result<GenerationResult> {
        self.validate(request)?;

        let span = info_span!(
            "generation",
            request_id = %Uuid::new_v4(),
            model = %request.model,
            width = request.width,
            height = request.height
        );

        async move {
            let mut previous: Option<&str> = None;

            for provider in &self.providers {
                if let Some(failed) = previous {
                    observer.on_fallback(failed, provider.name()).await;
                }

                let started = Instant::now();
                if let Some(image) = provider.generate(request).await {
                    info!(
                        provider = %provider.name(),
                        size = image.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Image generated"
                    );
                    return Ok(GenerationResult {
                        image,
                        source: provider.name().to_string(),
                    });
                }

                warn!(
                    provider = %provider.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Provider produced no image"
                );
                previous = Some(provider.name());
            }

            warn!("All providers failed");
            Err(AppError::AllProvidersFailed)
        }
        .instrument(span)
        .await
    }
}
