use std::sync::Arc;

use crate::config::config_schema;
use crate::errors::AppResult;
use crate::hooks::{LoggingHook, LoggingTransformer};
use crate::host::{LifecycleStage, PluginRegistry, UploaderRegistration};
use crate::post_process::MarkdownLinker;
use crate::uploader::{ImgeClient, ImgeUploader};

/// Identifier the plugin registers all of its parts under
pub const PLUGIN_ID: &str = "picgo-plugin-im.ge-uploader";

/// Settings key holding this uploader's configuration
pub const CONFIG_KEY: &str = "picBed.picgo-plugin-im.ge-uploader";

/// Name shown for the uploader in the host's UI
pub const UPLOADER_NAME: &str = "IM.GE";

/// The plugin as the host sees it
pub struct ImgePlugin {
    client: ImgeClient,
}

impl ImgePlugin {
    pub fn new() -> AppResult<Self> {
        Ok(Self::with_client(ImgeClient::new()?))
    }

    pub fn with_client(client: ImgeClient) -> Self {
        Self { client }
    }

    /// Uploader id the host should select to use this plugin
    pub fn uploader(&self) -> &'static str {
        PLUGIN_ID
    }

    pub fn transformer(&self) -> &'static str {
        PLUGIN_ID
    }

    pub fn register(&self, registry: &mut dyn PluginRegistry) {
        register(registry, self.client.clone());
    }
}

/// Wire the uploader, transformer and lifecycle hooks into `registry`
pub fn register(registry: &mut dyn PluginRegistry, client: ImgeClient) {
    registry.register_uploader(
        PLUGIN_ID,
        UploaderRegistration {
            name: UPLOADER_NAME.to_string(),
            handler: Arc::new(ImgeUploader::new(client)),
            config: config_schema,
        },
    );
    registry.register_transformer(PLUGIN_ID, Arc::new(LoggingTransformer));
    registry.register_lifecycle_hook(
        LifecycleStage::BeforeTransform,
        PLUGIN_ID,
        Arc::new(LoggingHook::new(LifecycleStage::BeforeTransform)),
    );
    registry.register_lifecycle_hook(
        LifecycleStage::BeforeUpload,
        PLUGIN_ID,
        Arc::new(LoggingHook::new(LifecycleStage::BeforeUpload)),
    );
    registry.register_lifecycle_hook(
        LifecycleStage::AfterUpload,
        PLUGIN_ID,
        Arc::new(MarkdownLinker),
    );
}
