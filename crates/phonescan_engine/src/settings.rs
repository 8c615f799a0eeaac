use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

/// Endpoints and timeouts for talking to the extraction backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base of the HTTP API, e.g. `http://localhost:8000/api`.
    pub api_base_url: String,
    /// Base of the task stream endpoints, e.g. `ws://localhost:8000/ws`.
    pub ws_base_url: String,
    /// Applies to the upload request only, not to server-side processing.
    pub upload_timeout: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            ws_base_url: DEFAULT_WS_URL.to_string(),
            upload_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientSettings {
    /// Defaults overridden by `PHONESCAN_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: std::env::var("PHONESCAN_API_URL").unwrap_or(defaults.api_base_url),
            ws_base_url: std::env::var("PHONESCAN_WS_URL").unwrap_or(defaults.ws_base_url),
            upload_timeout: std::env::var("PHONESCAN_UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.upload_timeout),
            ..defaults
        }
    }

    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Stream endpoint for one task: `{ws_base}/task/{id}/`.
    pub fn task_stream_url(&self, task_id: &str) -> String {
        format!(
            "{}/task/{}/",
            self.ws_base_url.trim_end_matches('/'),
            url::form_urlencoded::byte_serialize(task_id.as_bytes()).collect::<String>()
        )
    }
}
