// Interfaces the surrounding host application provides to the plugin
//
// The plugin never talks to a concrete host; it receives these traits so the
// pipeline can run inside a real image manager, the bundled LocalHost, or a test double.

pub mod local;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::image::ImageRecord;

/// User-facing notification raised through the host's event bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// One field of the settings form the host renders for this plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub message: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Stages at which the host calls registered lifecycle hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleStage {
    BeforeTransform,
    BeforeUpload,
    AfterUpload,
}

impl LifecycleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStage::BeforeTransform => "beforeTransform",
            LifecycleStage::BeforeUpload => "beforeUpload",
            LifecycleStage::AfterUpload => "afterUpload",
        }
    }
}

/// Settings, logging and notifications offered by the host during a batch
pub trait Host: Send + Sync {
    /// Raw settings stored under `key`, if any
    fn get_config(&self, key: &str) -> Option<serde_json::Value>;

    fn log(&self, level: log::Level, message: &str, details: Option<&serde_json::Value>);

    fn notify(&self, notification: Notification);
}

#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload every image in `output`; `false` tells the host the batch failed
    async fn handle(&self, host: &dyn Host, output: &mut [ImageRecord]) -> bool;
}

#[async_trait]
pub trait Transformer: Send + Sync {
    async fn handle(&self, host: &dyn Host, output: &mut [ImageRecord]);
}

#[async_trait]
pub trait LifecycleHook: Send + Sync {
    async fn handle(&self, host: &dyn Host, output: &mut [ImageRecord]) -> bool;
}

/// Everything the host needs to list and invoke an uploader
#[derive(Clone)]
pub struct UploaderRegistration {
    pub name: String,
    pub handler: Arc<dyn Uploader>,
    pub config: fn() -> Vec<ConfigField>,
}

impl std::fmt::Debug for UploaderRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploaderRegistration")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The host's plugin registry
pub trait PluginRegistry {
    fn register_uploader(&mut self, id: &str, registration: UploaderRegistration);

    fn register_transformer(&mut self, id: &str, transformer: Arc<dyn Transformer>);

    fn register_lifecycle_hook(
        &mut self,
        stage: LifecycleStage,
        id: &str,
        hook: Arc<dyn LifecycleHook>,
    );
}
