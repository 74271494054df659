//! Arta client: anonymous sign-up, job submission, then status polling

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::backend::ratio::closest_aspect_ratio;
use crate::backend::sleeper::{Sleeper, TokioSleeper};
use crate::backend::traits::{GenerationRequest, ImageProvider};
use crate::config::ArtaConfig;
use crate::error::{AppError, Result};

pub const PROVIDER_NAME: &str = "Arta.ai";

const STATUS_DONE: &str = "DONE";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    record_id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: Option<String>,
    #[serde(default)]
    response: Vec<StatusImage>,
}

#[derive(Debug, Deserialize)]
struct StatusImage {
    url: Option<String>,
}

/// Where a submitted job currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Done { image_url: String },
    InProgress(String),
}

/// Fallback provider with a token/submit/poll protocol
pub struct ArtaProvider {
    client: Client,
    config: ArtaConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl ArtaProvider {
    /// Create a new provider from configuration
    pub fn new(config: &ArtaConfig) -> Result<Self> {
        Self::with_sleeper(config, Arc::new(TokioSleeper))
    }

    /// Create a provider whose poll delay is driven by `sleeper`
    pub fn with_sleeper(config: &ArtaConfig, sleeper: Arc<dyn Sleeper>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
            sleeper,
        })
    }

    /// Obtain a fresh anonymous bearer token
    async fn acquire_token(&self) -> Result<String> {
        let headers = header_map(&[
            ("x-android-cert", &self.config.android_cert),
            ("x-firebase-gmpid", &self.config.firebase_gmpid),
            ("x-firebase-client", &self.config.firebase_client),
            ("user-agent", &self.config.auth_user_agent),
        ])?;

        let response = self
            .client
            .post(&self.config.auth_url)
            .query(&[("key", self.config.api_key.as_str())])
            .headers(headers)
            .json(&json!({ "clientType": "CLIENT_TYPE_ANDROID" }))
            .send()
            .await?;

        let body: SignUpResponse = read_json(response, "Arta auth").await?;
        body.id_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Protocol("auth response has no idToken".to_string()))
    }

    /// Submit the generation job and return its record id
    async fn submit_job(&self, token: &str, request: &GenerationRequest) -> Result<String> {
        let aspect_ratio = closest_aspect_ratio(request.width, request.height);

        let form = Form::new()
            .text("prompt", request.prompt.clone())
            .text("negative_prompt", "")
            .text("style", request.model.as_str())
            .text("images_num", "1")
            .text("cfg_scale", self.config.cfg_scale.clone())
            .text("steps", self.config.steps.clone())
            .text("aspect_ratio", aspect_ratio);

        debug!(provider = PROVIDER_NAME, aspect_ratio = aspect_ratio, "Submitting job");

        let response = self
            .client
            .post(&self.config.generate_url)
            .headers(self.app_headers(token)?)
            .multipart(form)
            .send()
            .await?;

        let body: SubmitResponse = read_json(response, "Arta submit").await?;
        match body.record_id {
            Some(serde_json::Value::String(id)) if !id.is_empty() => Ok(id),
            Some(serde_json::Value::Number(id)) => Ok(id.to_string()),
            _ => Err(AppError::Protocol(
                "submit response has no record_id".to_string(),
            )),
        }
    }

    /// Fetch the current status of a job once
    async fn check_status(&self, token: &str, record_id: &str) -> Result<JobStatus> {
        let url = format!(
            "{}/{}/status",
            self.config.generate_url.trim_end_matches('/'),
            record_id
        );

        let response = self
            .client
            .get(&url)
            .headers(self.app_headers(token)?)
            .send()
            .await?;

        let body: StatusResponse = read_json(response, "Arta status").await?;
        let status = body
            .status
            .ok_or_else(|| AppError::Protocol("status response has no status".to_string()))?;

        if status != STATUS_DONE {
            return Ok(JobStatus::InProgress(status));
        }

        let image_url = body
            .response
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or_else(|| AppError::Protocol("finished job has no image url".to_string()))?;

        Ok(JobStatus::Done { image_url })
    }

    /// Poll until the job is done or the attempt budget runs out
    async fn wait_for_image_url(&self, token: &str, record_id: &str) -> Result<String> {
        let attempts = self.config.max_poll_attempts;
        let interval = self.config.poll_interval();

        for attempt in 1..=attempts {
            match self.check_status(token, record_id).await? {
                JobStatus::Done { image_url } => {
                    debug!(provider = PROVIDER_NAME, attempt = attempt, "Job finished");
                    return Ok(image_url);
                }
                JobStatus::InProgress(status) => {
                    debug!(
                        provider = PROVIDER_NAME,
                        attempt = attempt,
                        status = %status,
                        "Job not ready yet"
                    );
                }
            }

            if attempt < attempts {
                self.sleeper.sleep(interval).await;
            }
        }

        Err(AppError::Timeout(format!(
            "job {} not finished after {} status checks",
            record_id, attempts
        )))
    }

    async fn download(&self, image_url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(image_url).send().await?;
        let response = ensure_success(response, "Arta image").await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn app_headers(&self, token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value(token)?);
        headers.insert(USER_AGENT, header_value(&self.config.app_user_agent)?);
        Ok(headers)
    }
}

#[async_trait]
impl ImageProvider for ArtaProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn try_generate(&self, request: &GenerationRequest) -> Result<Vec<u8>> {
        let token = self.acquire_token().await?;
        let record_id = self.submit_job(&token, request).await?;
        debug!(provider = PROVIDER_NAME, record_id = %record_id, "Job submitted");

        let image_url = self.wait_for_image_url(&token, &record_id).await?;
        self.download(&image_url).await
    }
}

async fn ensure_success(response: Response, service: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Upstream {
        service: service.to_string(),
        status,
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response, service: &str) -> Result<T> {
    let response = ensure_success(response, service).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::Protocol(format!("{} returned malformed JSON: {}", service, e)))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(format!("Invalid header value: {}", e)))
}

fn header_map(pairs: &[(&'static str, &String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        headers.insert(HeaderName::from_static(*name), header_value(value.as_str())?);
    }
    Ok(headers)
}
