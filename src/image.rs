use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::AppResult;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Content type used when the extension is missing or not an image type we know
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// One image moving through a batch
///
/// Created by the host with `buffer`, `file_name` and `extension` filled in.
/// The uploader sets `img_url` and `full_result`; the post-processor sets
/// `display_text`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(skip)]
    pub buffer: Vec<u8>,
    pub file_name: String,
    pub extension: Option<String>,
    pub img_url: Option<String>,
    pub full_result: Option<serde_json::Value>,
    pub display_text: Option<String>,
}

impl ImageRecord {
    pub fn new(file_name: impl Into<String>, extension: Option<&str>, buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            file_name: file_name.into(),
            extension: extension.map(str::to_string),
            ..Self::default()
        }
    }

    /// Read an image from disk, taking the file name and extension from the path
    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let buffer = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let extension = path.extension().and_then(|e| e.to_str());

        Ok(Self::new(file_name, extension, buffer))
    }

    pub fn size_mb(&self) -> f64 {
        self.buffer.len() as f64 / BYTES_PER_MB
    }

    pub fn content_type(&self) -> &'static str {
        content_type_for(self.extension.as_deref())
    }
}

/// Detect MIME type based on file extension
pub fn content_type_for(extension: Option<&str>) -> &'static str {
    let Some(extension) = extension else {
        return DEFAULT_CONTENT_TYPE;
    };

    match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" | "jfif" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "heic" => "image/heic",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for(Some("png")), "image/png");
        assert_eq!(content_type_for(Some(".JPG")), "image/jpeg");
        assert_eq!(content_type_for(Some("webp")), "image/webp");
        assert_eq!(content_type_for(Some("svg")), "image/svg+xml");
    }

    #[test]
    fn test_content_type_defaults_to_jpeg() {
        assert_eq!(content_type_for(None), "image/jpeg");
        assert_eq!(content_type_for(Some("")), "image/jpeg");
        assert_eq!(content_type_for(Some("psd")), "image/jpeg");
    }

    #[test]
    fn test_size_mb() {
        let image = ImageRecord::new("two.png", Some("png"), vec![0u8; 2 * 1024 * 1024]);
        assert_eq!(image.size_mb(), 2.0);

        let empty = ImageRecord::new("empty.png", None, Vec::new());
        assert_eq!(empty.size_mb(), 0.0);
    }

    #[tokio::test]
    async fn test_from_path_reads_name_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.PNG");
        std::fs::write(&path, b"not really a png").unwrap();

        let image = ImageRecord::from_path(&path).await.unwrap();
        assert_eq!(image.file_name, "shot.PNG");
        assert_eq!(image.extension.as_deref(), Some("PNG"));
        assert_eq!(image.content_type(), "image/png");
        assert_eq!(image.buffer, b"not really a png");
        assert!(image.img_url.is_none());
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let result = ImageRecord::from_path(Path::new("definitely_missing.png")).await;
        assert!(result.is_err());
    }
}
