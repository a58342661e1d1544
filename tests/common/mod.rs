// Shared helpers for the integration tests

#![allow(dead_code)]

use std::sync::Mutex;

use imge_uploader::host::{Host, Notification};
use imge_uploader::ImageRecord;
use mockito::{Server, ServerGuard};
use serde_json::{json, Value};

pub const UPLOAD_PATH: &str = "/api/1/upload";
pub const TEST_API_KEY: &str = "test-api-key";

/// Host double that records everything the plugin reports
pub struct RecordingHost {
    settings: Option<Value>,
    pub logs: Mutex<Vec<(log::Level, String, Option<Value>)>>,
    pub notifications: Mutex<Vec<Notification>>,
}

impl RecordingHost {
    pub fn new(settings: Option<Value>) -> Self {
        Self {
            settings,
            logs: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn with_limit(limit_mb: Value) -> Self {
        Self::new(Some(json!({ "apiKey": TEST_API_KEY, "imageMaxSize": limit_mb })))
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn logs_with_message(&self, message: &str) -> Vec<Option<Value>> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, m, _)| m == message)
            .map(|(_, _, details)| details.clone())
            .collect()
    }
}

impl Host for RecordingHost {
    fn get_config(&self, key: &str) -> Option<Value> {
        assert_eq!(key, imge_uploader::CONFIG_KEY);
        self.settings.clone()
    }

    fn log(&self, level: log::Level, message: &str, details: Option<&Value>) {
        self.logs
            .lock()
            .unwrap()
            .push((level, message.to_string(), details.cloned()));
    }

    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

pub async fn mock_imge_server() -> ServerGuard {
    Server::new_async().await
}

pub fn upload_url(server: &ServerGuard) -> String {
    format!("{}{}", server.url(), UPLOAD_PATH)
}

pub fn mock_success_response(url: &str) -> Value {
    json!({
        "status_code": 200,
        "status_txt": "OK",
        "success": { "message": "image uploaded", "code": 200 },
        "image": {
            "name": "x",
            "extension": "png",
            "url": url,
            "display_url": url
        }
    })
}

/// Image of `bytes` ASCII bytes so request bodies stay readable in matchers
pub fn image_of_size(name: &str, extension: Option<&str>, bytes: usize) -> ImageRecord {
    ImageRecord::new(name, extension, vec![b'a'; bytes])
}

pub const MB: usize = 1024 * 1024;
