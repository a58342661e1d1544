// Uploader stage - sends each image of a batch to im.ge
//
// Images go out one at a time; the first failure ends the batch.

pub mod imge_client;
pub mod upload_queue;

use async_trait::async_trait;

use crate::host::{Host, Uploader};
use crate::image::ImageRecord;

pub use imge_client::{ImgeClient, ImgeResponse, UploadOutcome, IMGE_UPLOAD_URL};
pub use upload_queue::{process_batch, process_upload_queue};

/// The uploader handed to the host's registry
pub struct ImgeUploader {
    client: ImgeClient,
}

impl ImgeUploader {
    pub fn new(client: ImgeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Uploader for ImgeUploader {
    async fn handle(&self, host: &dyn Host, output: &mut [ImageRecord]) -> bool {
        process_upload_queue(&self.client, host, output).await
    }
}
