// Minimal in-process host used by the command-line binary
//
// Settings come from a JSON file, logs go to the `log` facade and
// notifications are logged and kept in memory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};
use crate::image::ImageRecord;

use super::{
    Host, LifecycleHook, LifecycleStage, Notification, PluginRegistry, Transformer,
    UploaderRegistration,
};

const LOG_TARGET: &str = "imge_uploader::host";

pub struct LocalHost {
    settings: Value,
    notifications: Mutex<Vec<Notification>>,
    uploaders: HashMap<String, UploaderRegistration>,
    transformers: Vec<(String, Arc<dyn Transformer>)>,
    hooks: HashMap<LifecycleStage, Vec<(String, Arc<dyn LifecycleHook>)>>,
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl LocalHost {
    pub fn new(settings: Value) -> Self {
        Self {
            settings,
            notifications: Mutex::new(Vec::new()),
            uploaders: HashMap::new(),
            transformers: Vec::new(),
            hooks: HashMap::new(),
        }
    }

    /// Load settings from a JSON file; a missing file means empty settings
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            log::info!(
                "No settings file at {}, starting with empty settings",
                path.display()
            );
            return Ok(Self::default());
        }

        let settings_str = fs::read_to_string(path)?;
        let settings: Value = serde_json::from_str(&settings_str)?;
        if !settings.is_object() {
            return Err(AppError::configuration(&format!(
                "Settings file {} must contain a JSON object",
                path.display()
            )));
        }

        log::info!("Loaded settings from {}", path.display());
        Ok(Self::new(settings))
    }

    /// Store `value` under `key`; the part before the first `.` names a section
    pub fn set_config(&mut self, key: &str, value: Value) {
        let Some(root) = self.settings.as_object_mut() else {
            return;
        };

        match key.split_once('.') {
            Some((section, entry)) => {
                let section = root
                    .entry(section.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !section.is_object() {
                    *section = Value::Object(Map::new());
                }
                if let Some(section) = section.as_object_mut() {
                    section.insert(entry.to_string(), value);
                }
            }
            None => {
                root.insert(key.to_string(), value);
            }
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        match self.notifications.lock() {
            Ok(notifications) => notifications.clone(),
            Err(e) => {
                log::warn!("Failed to read notifications (non-critical): {}", e);
                Vec::new()
            }
        }
    }

    pub fn uploader_ids(&self) -> Vec<&str> {
        self.uploaders.keys().map(String::as_str).collect()
    }

    /// Run one batch through every registered stage using uploader `uploader_id`
    ///
    /// Returns the uploader's verdict. A before-hook returning `false` stops
    /// the batch; after-upload hooks only run for successful uploads.
    pub async fn run(&self, uploader_id: &str, images: &mut [ImageRecord]) -> AppResult<bool> {
        let registration = self.uploaders.get(uploader_id).ok_or_else(|| {
            AppError::configuration(&format!("No uploader registered as '{}'", uploader_id))
        })?;

        if !self.run_hooks(LifecycleStage::BeforeTransform, images).await {
            return Ok(false);
        }

        for (id, transformer) in &self.transformers {
            log::debug!("Running transformer {}", id);
            transformer.handle(self, images).await;
        }

        if !self.run_hooks(LifecycleStage::BeforeUpload, images).await {
            return Ok(false);
        }

        log::info!(
            "Uploading {} images with {}",
            images.len(),
            registration.name
        );
        if !registration.handler.handle(self, images).await {
            return Ok(false);
        }

        self.run_hooks(LifecycleStage::AfterUpload, images).await;
        Ok(true)
    }

    async fn run_hooks(&self, stage: LifecycleStage, images: &mut [ImageRecord]) -> bool {
        let Some(hooks) = self.hooks.get(&stage) else {
            return true;
        };

        for (id, hook) in hooks {
            if !hook.handle(self, images).await {
                log::warn!("{} hook {} stopped the batch", stage.as_str(), id);
                return false;
            }
        }
        true
    }
}

/// Look up a dotted key, allowing dots inside key names (`picBed.a.b-plugin`)
fn lookup<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(found) = value.get(key) {
        return Some(found);
    }

    key.match_indices('.').find_map(|(i, _)| {
        value
            .get(&key[..i])
            .and_then(|child| lookup(child, &key[i + 1..]))
    })
}

/// `<config dir>/imge-uploader/settings.json`
pub fn default_settings_path() -> AppResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AppError::configuration("Could not find config directory"))?
        .join("imge-uploader");

    Ok(config_dir.join("settings.json"))
}

impl Host for LocalHost {
    fn get_config(&self, key: &str) -> Option<Value> {
        lookup(&self.settings, key).cloned()
    }

    fn log(&self, level: log::Level, message: &str, details: Option<&Value>) {
        match details {
            Some(details) => log::log!(target: LOG_TARGET, level, "{} {}", message, details),
            None => log::log!(target: LOG_TARGET, level, "{}", message),
        }
    }

    fn notify(&self, notification: Notification) {
        log::warn!(
            target: LOG_TARGET,
            "{}: {}",
            notification.title,
            notification.body
        );
        match self.notifications.lock() {
            Ok(mut notifications) => notifications.push(notification),
            Err(e) => log::warn!("Failed to store notification (non-critical): {}", e),
        }
    }
}

impl PluginRegistry for LocalHost {
    fn register_uploader(&mut self, id: &str, registration: UploaderRegistration) {
        log::debug!("Registered uploader {} ({})", id, registration.name);
        self.uploaders.insert(id.to_string(), registration);
    }

    fn register_transformer(&mut self, id: &str, transformer: Arc<dyn Transformer>) {
        self.transformers.push((id.to_string(), transformer));
    }

    fn register_lifecycle_hook(
        &mut self,
        stage: LifecycleStage,
        id: &str,
        hook: Arc<dyn LifecycleHook>,
    ) {
        self.hooks
            .entry(stage)
            .or_default()
            .push((id.to_string(), hook));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Uploader;
    use async_trait::async_trait;
    use serde_json::json;

    #[test]
    fn test_lookup_with_dotted_plugin_id() {
        let settings = json!({
            "picBed": {
                "picgo-plugin-im.ge-uploader": { "apiKey": "abc" }
            }
        });
        let host = LocalHost::new(settings);

        let config = host.get_config("picBed.picgo-plugin-im.ge-uploader").unwrap();
        assert_eq!(config["apiKey"], "abc");
        assert!(host.get_config("picBed.other").is_none());
        assert!(host.get_config("missing").is_none());
    }

    #[test]
    fn test_set_config_round_trips_through_get() {
        let mut host = LocalHost::default();
        host.set_config("picBed.picgo-plugin-im.ge-uploader", json!({ "apiKey": "k" }));

        let config = host.get_config("picBed.picgo-plugin-im.ge-uploader").unwrap();
        assert_eq!(config, json!({ "apiKey": "k" }));
    }

    #[test]
    fn test_load_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();

        let missing = LocalHost::load(&dir.path().join("nope.json")).unwrap();
        assert!(missing.get_config("picBed").is_none());

        let not_object = dir.path().join("list.json");
        fs::write(&not_object, "[1, 2]").unwrap();
        assert!(matches!(
            LocalHost::load(&not_object),
            Err(AppError::Configuration(_))
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(LocalHost::load(&broken), Err(AppError::Json(_))));
    }

    #[test]
    fn test_notify_keeps_notifications() {
        let host = LocalHost::default();
        host.notify(Notification {
            title: "t".to_string(),
            body: "b".to_string(),
        });
        assert_eq!(host.notifications().len(), 1);
        assert_eq!(host.notifications()[0].body, "b");
    }

    struct Refuse;

    #[async_trait]
    impl LifecycleHook for Refuse {
        async fn handle(&self, _host: &dyn Host, _output: &mut [ImageRecord]) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_run_unknown_uploader() {
        let host = LocalHost::default();
        let mut images = vec![ImageRecord::new("a.png", Some("png"), vec![1])];
        assert!(host.run("nobody", &mut images).await.is_err());
    }

    #[tokio::test]
    async fn test_before_hook_can_stop_batch() {
        struct NeverCalled;

        #[async_trait]
        impl Uploader for NeverCalled {
            async fn handle(&self, _host: &dyn Host, _output: &mut [ImageRecord]) -> bool {
                panic!("uploader should not run");
            }
        }

        let mut host = LocalHost::default();
        host.register_uploader(
            "test",
            UploaderRegistration {
                name: "Test".to_string(),
                handler: Arc::new(NeverCalled),
                config: Vec::new,
            },
        );
        host.register_lifecycle_hook(LifecycleStage::BeforeUpload, "test", Arc::new(Refuse));

        let mut images = vec![ImageRecord::new("a.png", Some("png"), vec![1])];
        assert!(!host.run("test", &mut images).await.unwrap());
    }
}
