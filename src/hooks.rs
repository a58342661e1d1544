// Pass-through registrations the host expects from an uploader plugin.
// None of these touch the images.

use async_trait::async_trait;
use serde_json::json;

use crate::host::{Host, LifecycleHook, LifecycleStage, Transformer};
use crate::image::ImageRecord;

/// Transformer that only records which files entered the batch
pub struct LoggingTransformer;

#[async_trait]
impl Transformer for LoggingTransformer {
    async fn handle(&self, host: &dyn Host, output: &mut [ImageRecord]) {
        for image in output.iter() {
            host.log(
                log::Level::Debug,
                "transform",
                Some(&json!({ "file_name": image.file_name })),
            );
        }
    }
}

/// Hook that logs the batch size at its stage and lets the batch continue
pub struct LoggingHook {
    stage: LifecycleStage,
}

impl LoggingHook {
    pub fn new(stage: LifecycleStage) -> Self {
        Self { stage }
    }
}

#[async_trait]
impl LifecycleHook for LoggingHook {
    async fn handle(&self, host: &dyn Host, output: &mut [ImageRecord]) -> bool {
        host.log(
            log::Level::Debug,
            self.stage.as_str(),
            Some(&json!({ "images": output.len() })),
        );
        true
    }
}
