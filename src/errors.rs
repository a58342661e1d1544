use thiserror::Error;

use crate::host::{Host, Notification};

/// Title of the notification raised when a batch fails to upload
pub const UPLOAD_ERROR_TITLE: &str = "IM.GE upload error";

const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Image {file_name} is {size_mb:.2}MB, which exceeds the {limit_mb}MB limit")]
    SizeLimit {
        file_name: String,
        size_mb: f64,
        limit_mb: f64,
    },

    #[error("Upload failed: {status_text}")]
    RemoteUpload { status_code: i64, status_text: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response from im.ge (HTTP {status}): {reason}")]
    InvalidResponse { status: u16, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Custom result type
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn configuration(message: &str) -> Self {
        Self::Configuration(message.to_string())
    }

    pub fn size_limit(file_name: &str, size_mb: f64, limit_mb: f64) -> Self {
        Self::SizeLimit {
            file_name: file_name.to_string(),
            size_mb,
            limit_mb,
        }
    }

    pub fn remote_upload(status_code: i64, status_text: &str) -> Self {
        Self::RemoteUpload {
            status_code,
            status_text: status_text.to_string(),
        }
    }

    pub fn invalid_response(status: u16, reason: &str) -> Self {
        Self::InvalidResponse {
            status,
            reason: reason.to_string(),
        }
    }

    /// Error text without the variant's prefix
    fn detail(&self) -> String {
        match self {
            AppError::Configuration(message) => message.clone(),
            AppError::RemoteUpload { status_text, .. } => status_text.clone(),
            AppError::InvalidResponse { reason, .. } => reason.clone(),
            AppError::Transport(e) => e.to_string(),
            AppError::Io(e) => e.to_string(),
            AppError::Json(e) => e.to_string(),
            AppError::SizeLimit { .. } => self.to_string(),
        }
    }

    /// Body of the user-facing notification for this error
    pub fn notification_body(&self) -> String {
        if self.detail().trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            self.to_string()
        }
    }
}

/// Report a failed batch to the host: one error log entry and one notification
pub fn report_upload_failure(host: &dyn Host, error: &AppError) {
    host.log(
        log::Level::Error,
        "IM.GE upload failed",
        Some(&serde_json::json!({ "error": error.to_string(), "detail": format!("{:?}", error) })),
    );
    host.notify(Notification {
        title: UPLOAD_ERROR_TITLE.to_string(),
        body: error.notification_body(),
    });
}
