use crate::{
    config::{RetryPolicy, ServiceConfig},
    error::{PanelError, RequestError, Result},
    logger,
    models::{GenerationRequest, ImagePayload},
    service::ImageService,
};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Shape of the service's error responses, e.g. `{"error": "Enter minimum 5%"}`.
#[derive(Deserialize)]
struct ServiceErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct HttpImageService {
    client: Client,
    endpoint: Url,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpImageService {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let endpoint = config.endpoint_url()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PanelError::ConfigError(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            timeout: config.timeout,
            retry: config.retry.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send_once(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<ImagePayload, RequestError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        if bytes.is_empty() {
            return Err(RequestError::EmptyBody);
        }

        Ok(ImagePayload {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    fn classify(&self, error: reqwest::Error) -> RequestError {
        if error.is_timeout() {
            RequestError::Timeout(self.timeout.as_millis() as u64)
        } else {
            RequestError::Transport(error.to_string())
        }
    }

    fn is_retryable(&self, error: &RequestError) -> bool {
        error.is_transient()
            || error
                .status()
                .map_or(false, |status| self.retry.is_retryable_status(status))
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> RequestError {
    let message = serde_json::from_slice::<ServiceErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.trim().is_empty());

    RequestError::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ImageService for HttpImageService {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<ImagePayload, RequestError> {
        let mut timer = logger::timer(&format!("generate_image {}", request.request_id));
        let mut attempt = 0;

        log::info!(
            "🎨 Requesting {} image at {}% [req:{}]",
            request.category.display_name(),
            request.percentage,
            request.request_id
        );

        loop {
            match self.send_once(request).await {
                Ok(payload) => {
                    let elapsed = timer.stop();
                    log::info!(
                        "✅ Received {} bytes in {}ms [req:{}]",
                        payload.bytes.len(),
                        elapsed.as_millis(),
                        request.request_id
                    );
                    return Ok(payload);
                }
                Err(e) if attempt < self.retry.max_retries && self.is_retryable(&e) => {
                    let delay = self.retry.backoff_for(attempt);
                    attempt += 1;
                    log::warn!(
                        "⚠️  Attempt {} failed ({}), retrying in {}ms [req:{}]",
                        attempt,
                        e,
                        delay.as_millis(),
                        request.request_id
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
