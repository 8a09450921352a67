use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::{
    error::{PanelError, Result},
    logger::{LogLevel, LoggerConfig},
};

pub const DEFAULT_SERVICE_URL: &str = "https://tensile-elongation-backend.onrender.com";
pub const DEFAULT_ENDPOINT_PATH: &str = "/generate_image";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            retryable_statuses: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Delay before retry number `attempt` (0-based): doubles each time, capped.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Whole seconds, at least one. Anything else is ignored by the caller.
pub fn parse_timeout_secs(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub endpoint_path: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: DEFAULT_SERVICE_URL.to_string(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("ELONGATION_SERVICE_URL") {
            config.base_url = url;
        }
        if let Some(timeout) = env::var("ELONGATION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| parse_timeout_secs(&s))
        {
            config.timeout = timeout;
        }
        if let Some(retries) = env::var("ELONGATION_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
        {
            config.retry.max_retries = retries;
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of the generation endpoint. Only `http` and `https` base
    /// URLs are accepted.
    pub fn endpoint_url(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url).map_err(|e| {
            PanelError::ConfigError(format!("invalid service URL '{}': {}", self.base_url, e))
        })?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(PanelError::ConfigError(format!(
                "unsupported scheme '{}' in service URL",
                base.scheme()
            )));
        }
        if base.host_str().is_none() {
            return Err(PanelError::ConfigError(format!(
                "service URL '{}' has no host",
                self.base_url
            )));
        }

        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            self.endpoint_path.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|e| PanelError::ConfigError(format!("invalid endpoint '{}': {}", joined, e)))
    }
}

#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub service: ServiceConfig,
    pub download_dir: PathBuf,
    pub logger: LoggerConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        PanelConfig {
            service: ServiceConfig::default(),
            download_dir: PathBuf::from("."),
            logger: LoggerConfig::default(),
        }
    }
}

impl PanelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let download_dir = env::var("ELONGATION_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let mut logger = LoggerConfig::default();
        if let Some(level) = env::var("ELONGATION_LOG_LEVEL")
            .ok()
            .and_then(|s| s.parse::<LogLevel>().ok())
        {
            logger = logger.with_level(level);
        }
        let json_logs = env::var("ELONGATION_LOG_JSON")
            .ok()
            .map_or(false, |val| val == "true");
        logger = logger.with_json_output(json_logs);

        PanelConfig {
            service: ServiceConfig::from_env(),
            download_dir,
            logger,
        }
    }

    pub fn with_service(mut self, service: ServiceConfig) -> Self {
        self.service = service;
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_logger(mut self, logger: LoggerConfig) -> Self {
        self.logger = logger;
        self
    }
}
