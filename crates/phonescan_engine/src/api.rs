use phonescan_logging::{scan_debug, scan_info, scan_warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::{
    ApiError, ClientSettings, FailureKind, TaskList, TaskResults, TaskStatusReport, UploadFile,
    UploadResponse,
};

/// HTTP surface of the extraction backend.
#[async_trait::async_trait]
pub trait TaskApi: Send + Sync {
    async fn upload_video(&self, file: &UploadFile) -> Result<UploadResponse, ApiError>;

    async fn fetch_results(&self, task_id: &str) -> Result<TaskResults, ApiError>;

    async fn fetch_status(&self, task_id: &str) -> Result<TaskStatusReport, ApiError>;

    async fn list_tasks(&self, status: Option<&str>, limit: u32) -> Result<TaskList, ApiError>;

    /// Returns the server's confirmation message.
    async fn delete_task(&self, task_id: &str) -> Result<String, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Deserialize)]
struct DeleteResponse {
    message: String,
}

impl ReqwestApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        // No client-wide timeout: uploads and queries each set their own.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn task_url(&self, task_id: &str, suffix: &str) -> String {
        let id: String = url::form_urlencoded::byte_serialize(task_id.as_bytes()).collect();
        self.settings.api_url(&format!("task/{id}{suffix}"))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_response(response).await
    }
}

#[async_trait::async_trait]
impl TaskApi for ReqwestApiClient {
    async fn upload_video(&self, file: &UploadFile) -> Result<UploadResponse, ApiError> {
        let url = self.settings.api_url("upload-video");
        scan_info!(
            "Uploading {} ({} bytes, {}) to {}",
            file.file_name,
            file.size,
            file.media_type,
            url
        );

        let handle = tokio::fs::File::open(&file.path).await.map_err(|err| {
            ApiError::new(
                FailureKind::Io,
                format!("cannot read {}: {err}", file.path.display()),
            )
        })?;
        let body = Body::wrap_stream(ReaderStream::new(handle));
        let part = Part::stream_with_length(body, file.size)
            .file_name(file.file_name.clone())
            .mime_str(&file.media_type)
            .map_err(|err| {
                ApiError::new(
                    FailureKind::Io,
                    format!("invalid media type {}: {err}", file.media_type),
                )
            })?;
        let form = Form::new().part("video", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.settings.upload_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let upload: UploadResponse = decode_response(response).await?;
        scan_info!("Upload accepted, task_id={}", upload.task_id);
        Ok(upload)
    }

    async fn fetch_results(&self, task_id: &str) -> Result<TaskResults, ApiError> {
        let url = self.task_url(task_id, "/results");
        scan_debug!("Fetching results from {}", url);
        self.send_json(self.client.get(&url)).await
    }

    async fn fetch_status(&self, task_id: &str) -> Result<TaskStatusReport, ApiError> {
        let url = self.task_url(task_id, "");
        self.send_json(self.client.get(&url)).await
    }

    async fn list_tasks(&self, status: Option<&str>, limit: u32) -> Result<TaskList, ApiError> {
        let url = self.settings.api_url("tasks");
        let mut query = vec![("limit", limit.to_string())];
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        self.send_json(self.client.get(&url).query(&query)).await
    }

    async fn delete_task(&self, task_id: &str) -> Result<String, ApiError> {
        let url = self.task_url(task_id, "");
        let response: DeleteResponse = self.send_json(self.client.delete(&url)).await?;
        Ok(response.message)
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(map_reqwest_error)?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.detail)
            .filter(|detail| !detail.is_empty());
        let message = detail.unwrap_or_else(|| {
            format!("Request failed with status code {}", status.as_u16())
        });
        scan_warn!("Backend returned {}: {}", status, message);
        return Err(ApiError::new(FailureKind::HttpStatus(status.as_u16()), message));
    }

    serde_json::from_str(&body).map_err(|err| {
        ApiError::new(
            FailureKind::InvalidResponse,
            format!("Unexpected response from server: {err}"),
        )
    })
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, "Request timed out");
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
