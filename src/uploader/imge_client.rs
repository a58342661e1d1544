use reqwest::{multipart, Client};
use serde::Deserialize;
use tokio::time::Duration;
use url::Url;

use crate::errors::{AppError, AppResult};
use crate::image::ImageRecord;
use crate::security;

/// Public im.ge upload endpoint
pub const IMGE_UPLOAD_URL: &str = "https://im.ge/api/1/upload";

const API_KEY_HEADER: &str = "X-API-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Fields of the im.ge upload response the uploader reads
#[derive(Debug, Clone, Deserialize)]
pub struct ImgeResponse {
    pub status_code: i64,
    #[serde(default)]
    pub status_txt: Option<String>,
    #[serde(default)]
    pub image: Option<ImgeImage>,
    #[serde(default)]
    pub error: Option<ImgeErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImgeImage {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImgeErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ImgeResponse {
    /// Text describing the service's status, falling back to the error body
    ///
    /// Empty when the response carries neither.
    pub fn status_text(&self) -> String {
        self.status_txt
            .clone()
            .filter(|text| !text.trim().is_empty())
            .or_else(|| self.error.as_ref().and_then(|e| e.message.clone()))
            .unwrap_or_default()
    }
}

/// A successful upload: the hosted URL plus the response exactly as decoded
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub url: String,
    pub raw: serde_json::Value,
}

/// HTTP client for the im.ge upload API
#[derive(Debug, Clone)]
pub struct ImgeClient {
    client: Client,
    endpoint: String,
}

impl ImgeClient {
    pub fn new() -> AppResult<Self> {
        Self::with_endpoint(IMGE_UPLOAD_URL)
    }

    /// Client that posts to `endpoint` instead of im.ge (mirrors, tests)
    pub fn with_endpoint(endpoint: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("imge-uploader/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload one image; a single attempt, no retries
    pub async fn upload(&self, api_key: &str, image: &ImageRecord) -> AppResult<UploadOutcome> {
        let form = build_form(image)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        log::debug!(
            "im.ge response for {} (HTTP {}, first 300 chars): {}",
            image.file_name,
            status,
            body.chars().take(300).collect::<String>()
        );

        interpret_response(status.as_u16(), &body)
    }
}

pub fn build_form(image: &ImageRecord) -> AppResult<multipart::Form> {
    let part = multipart::Part::bytes(image.buffer.clone())
        .file_name(security::sanitize_filename(&image.file_name))
        .mime_str(image.content_type())?;

    Ok(multipart::Form::new()
        .part("source", part)
        .text("format", "json"))
}

/// Turn a raw response body into an upload outcome
///
/// im.ge answers failures with a JSON body and a 4xx status, so the body is
/// decoded whatever the HTTP status and `status_code` decides the result.
pub fn interpret_response(http_status: u16, body: &str) -> AppResult<UploadOutcome> {
    let raw: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        AppError::invalid_response(http_status, &format!("body is not JSON ({})", e))
    })?;

    let parsed: ImgeResponse = serde_json::from_value(raw.clone()).map_err(|e| {
        AppError::invalid_response(http_status, &format!("unexpected response shape ({})", e))
    })?;

    if parsed.status_code != 200 {
        return Err(AppError::remote_upload(
            parsed.status_code,
            &parsed.status_text(),
        ));
    }

    let url = parsed
        .image
        .map(|image| image.url)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::invalid_response(http_status, "response has no image url"))?;

    check_image_url(http_status, &url)?;

    Ok(UploadOutcome { url, raw })
}

/// The hosted URL must be absolute http(s) so it can be linked as-is
fn check_image_url(http_status: u16, url: &str) -> AppResult<()> {
    let parsed = Url::parse(url).map_err(|e| {
        AppError::invalid_response(http_status, &format!("invalid image url '{}' ({})", url, e))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::invalid_response(
            http_status,
            &format!("unsupported image url scheme '{}'", parsed.scheme()),
        ));
    }

    Ok(())
}
