use serde_json::Value;

use crate::errors::{AppError, AppResult};
use crate::host::{ConfigField, Host};
use crate::plugin::CONFIG_KEY;

/// Upload size limit applied when the user has not set one, in megabytes
pub const DEFAULT_IMAGE_MAX_SIZE_MB: f64 = 5.0;

/// Validated settings for one batch
#[derive(Clone, PartialEq)]
pub struct PluginConfig {
    pub api_key: String,
    pub image_max_size: f64, // MB
}

impl std::fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfig")
            .field("api_key", &"<redacted>")
            .field("image_max_size", &self.image_max_size)
            .finish()
    }
}

impl PluginConfig {
    /// Read this plugin's settings from the host and validate them
    pub fn load(host: &dyn Host) -> AppResult<Self> {
        Self::resolve(host.get_config(CONFIG_KEY).as_ref())
    }

    /// Validate raw settings, filling in defaults for optional fields
    pub fn resolve(raw: Option<&Value>) -> AppResult<Self> {
        let raw = raw
            .filter(|value| !value.is_null())
            .ok_or_else(|| AppError::configuration("No IM.GE settings found"))?;

        let settings = raw
            .as_object()
            .ok_or_else(|| AppError::configuration("IM.GE settings must be an object"))?;

        let api_key = match settings.get("apiKey") {
            Some(Value::String(key)) if !key.trim().is_empty() => key.trim().to_string(),
            Some(Value::String(_)) | Some(Value::Null) | None => {
                return Err(AppError::configuration("apiKey is required"))
            }
            Some(_) => return Err(AppError::configuration("apiKey must be a string")),
        };

        let image_max_size = parse_max_size(settings.get("imageMaxSize"))?;

        Ok(Self {
            api_key,
            image_max_size,
        })
    }
}

fn parse_max_size(value: Option<&Value>) -> AppResult<f64> {
    let size = match value {
        None | Some(Value::Null) => return Ok(DEFAULT_IMAGE_MAX_SIZE_MB),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(DEFAULT_IMAGE_MAX_SIZE_MB),
        Some(Value::String(text)) => text.trim().parse::<f64>().map_err(|_| {
            AppError::configuration(&format!("imageMaxSize must be a number, got '{}'", text))
        })?,
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| AppError::configuration("imageMaxSize is out of range"))?,
        Some(other) => {
            return Err(AppError::configuration(&format!(
                "imageMaxSize must be a number, got {}",
                other
            )))
        }
    };

    if !size.is_finite() || size <= 0.0 {
        return Err(AppError::configuration(
            "imageMaxSize must be greater than 0",
        ));
    }

    Ok(size)
}

/// Settings form shown by the host for this uploader
pub fn config_schema() -> Vec<ConfigField> {
    vec![
        ConfigField {
            name: "apiKey".to_string(),
            field_type: "input".to_string(),
            message: "IM.GE API Key".to_string(),
            required: true,
            default: None,
        },
        ConfigField {
            name: "imageMaxSize".to_string(),
            field_type: "input".to_string(),
            message: "Image size limit (MB)".to_string(),
            required: false,
            default: Some("5".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_defaults_max_size() {
        let config = PluginConfig::resolve(Some(&json!({ "apiKey": "key-123" }))).unwrap();
        assert_eq!(config.api_key, "key-123");
        assert_eq!(config.image_max_size, 5.0);
    }

    #[test]
    fn test_resolve_accepts_string_and_number_sizes() {
        let from_string =
            PluginConfig::resolve(Some(&json!({ "apiKey": "k", "imageMaxSize": "10" }))).unwrap();
        assert_eq!(from_string.image_max_size, 10.0);

        let from_number =
            PluginConfig::resolve(Some(&json!({ "apiKey": "k", "imageMaxSize": 2.5 }))).unwrap();
        assert_eq!(from_number.image_max_size, 2.5);

        let blank =
            PluginConfig::resolve(Some(&json!({ "apiKey": "k", "imageMaxSize": "" }))).unwrap();
        assert_eq!(blank.image_max_size, DEFAULT_IMAGE_MAX_SIZE_MB);
    }

    #[test]
    fn test_resolve_rejects_missing_api_key() {
        for raw in [
            json!({}),
            json!({ "apiKey": "" }),
            json!({ "apiKey": "   " }),
            json!({ "apiKey": null }),
            json!({ "apiKey": 42 }),
        ] {
            let result = PluginConfig::resolve(Some(&raw));
            assert!(
                matches!(result, Err(AppError::Configuration(_))),
                "expected configuration error for {}",
                raw
            );
        }
    }

    #[test]
    fn test_resolve_rejects_missing_settings() {
        assert!(matches!(
            PluginConfig::resolve(None),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            PluginConfig::resolve(Some(&Value::Null)),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            PluginConfig::resolve(Some(&json!("key"))),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_bad_sizes() {
        for size in [json!("abc"), json!("0"), json!(-3), json!(true), json!("inf")] {
            let raw = json!({ "apiKey": "k", "imageMaxSize": size });
            assert!(
                PluginConfig::resolve(Some(&raw)).is_err(),
                "expected error for imageMaxSize {}",
                size
            );
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = PluginConfig::resolve(Some(&json!({ "apiKey": "secret-key" }))).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_config_schema() {
        let schema = config_schema();
        assert_eq!(schema.len(), 2);

        assert_eq!(schema[0].name, "apiKey");
        assert!(schema[0].required);
        assert_eq!(schema[0].default, None);

        assert_eq!(schema[1].name, "imageMaxSize");
        assert!(!schema[1].required);
        assert_eq!(schema[1].default.as_deref(), Some("5"));
        assert!(schema.iter().all(|field| field.field_type == "input"));
    }
}
