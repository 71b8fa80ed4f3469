//! Configuration for the upload-and-poll workflow.
//!
//! All workflow behaviour is controlled through [`WorkflowConfig`], built via
//! its [`WorkflowConfigBuilder`]. Defaults reproduce the backend contract:
//! a local development server, 30 poll attempts, 1.5 s apart.

use crate::error::HingeError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::time::Duration;

/// The only file name the backend accepts.
pub const REQUIRED_FILE_NAME: &str = "matches.json";

/// Origin of the analysis backend when none is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Configuration for a [`crate::workflow::Workflow`].
///
/// Built via [`WorkflowConfig::builder()`] or using
/// [`WorkflowConfig::default()`].
///
/// # Example
/// ```rust
/// use hinge_analysis::WorkflowConfig;
///
/// let config = WorkflowConfig::builder()
///     .api_base("http://127.0.0.1:9000/")
///     .max_attempts(10)
///     .build()
///     .unwrap();
/// assert_eq!(config.api_base, "http://127.0.0.1:9000");
/// ```
#[derive(Clone)]
pub struct WorkflowConfig {
    /// Origin of the analysis backend, without a trailing slash.
    /// Default: `http://localhost:8000`.
    pub api_base: String,

    /// Maximum number of GET requests issued by one poll loop. Default: 30.
    pub max_attempts: u32,

    /// Fixed delay between two poll attempts in milliseconds. Default: 1500.
    ///
    /// There is no backoff and no jitter: every gap is exactly this long
    /// (plus timer scheduling slack).
    pub poll_interval_ms: u64,

    /// Per-request timeout in seconds for both upload and poll. Default: 30.
    pub request_timeout_secs: u64,

    /// Optional observer for status changes and poll progress.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            max_attempts: 30,
            poll_interval_ms: 1500,
            request_timeout_secs: 30,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for WorkflowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowConfig")
            .field("api_base", &self.api_base)
            .field("max_attempts", &self.max_attempts)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn WorkflowProgressCallback>"),
            )
            .finish()
    }
}

impl WorkflowConfig {
    /// Create a new builder for `WorkflowConfig`.
    pub fn builder() -> WorkflowConfigBuilder {
        WorkflowConfigBuilder {
            config: Self::default(),
        }
    }

    /// Delay between two poll attempts.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `{api_base}/upload_hinge`
    pub fn upload_url(&self) -> String {
        format!("{}/upload_hinge", self.api_base)
    }

    /// `{api_base}/hinge_results.json`, without the cache-busting query.
    pub fn results_url(&self) -> String {
        format!("{}/hinge_results.json", self.api_base)
    }
}

/// Builder for [`WorkflowConfig`].
#[derive(Debug)]
pub struct WorkflowConfigBuilder {
    config: WorkflowConfig,
}

impl WorkflowConfigBuilder {
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        let base: String = base.into();
        self.config.api_base = base.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<WorkflowConfig, HingeError> {
        let c = &self.config;
        let url = reqwest::Url::parse(&c.api_base).map_err(|e| {
            HingeError::InvalidConfig(format!("API base '{}' is not a URL: {e}", c.api_base))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HingeError::InvalidConfig(format!(
                "API base must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if c.max_attempts == 0 {
            return Err(HingeError::InvalidConfig(
                "max_attempts must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_contract() {
        let c = WorkflowConfig::default();
        assert_eq!(c.api_base, "http://localhost:8000");
        assert_eq!(c.max_attempts, 30);
        assert_eq!(c.poll_interval(), Duration::from_millis(1500));
        assert_eq!(c.upload_url(), "http://localhost:8000/upload_hinge");
        assert_eq!(c.results_url(), "http://localhost:8000/hinge_results.json");
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let c = WorkflowConfig::builder()
            .api_base("https://analysis.example.org//")
            .build()
            .unwrap();
        assert_eq!(c.api_base, "https://analysis.example.org");
    }

    #[test]
    fn rejects_non_http_base() {
        let err = WorkflowConfig::builder()
            .api_base("ftp://example.org")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http or https"), "got: {err}");

        assert!(WorkflowConfig::builder()
            .api_base("not a url")
            .build()
            .is_err());
    }

    #[test]
    fn rejects_zero_attempts() {
        let err = WorkflowConfig::builder().max_attempts(0).build().unwrap_err();
        assert!(matches!(err, HingeError::InvalidConfig(_)));
    }

    #[test]
    fn debug_hides_callback() {
        let c = WorkflowConfig::default();
        let s = format!("{c:?}");
        assert!(s.contains("max_attempts: 30"));
    }
}
