use serde_json::json;
use uuid::Uuid;

use crate::config::PluginConfig;
use crate::errors::{report_upload_failure, AppError, AppResult};
use crate::host::Host;
use crate::image::ImageRecord;

use super::imge_client::ImgeClient;

/// Upload a batch, reporting any failure to the host
///
/// Returns `true` when every image was uploaded. On failure the error has
/// already been logged and notified; images before the failing one keep
/// their annotations and later ones are left untouched.
pub async fn process_upload_queue(
    client: &ImgeClient,
    host: &dyn Host,
    output: &mut [ImageRecord],
) -> bool {
    match process_batch(client, host, output).await {
        Ok(()) => true,
        Err(e) => {
            report_upload_failure(host, &e);
            false
        }
    }
}

/// Upload every image in order, stopping at the first error
pub async fn process_batch(
    client: &ImgeClient,
    host: &dyn Host,
    output: &mut [ImageRecord],
) -> AppResult<()> {
    let config = PluginConfig::load(host)?;
    let batch_id = Uuid::new_v4().to_string();

    log::info!(
        "Processing {} images for batch {} (limit {}MB)",
        output.len(),
        batch_id,
        config.image_max_size
    );

    for (index, image) in output.iter_mut().enumerate() {
        check_size(image, &config)?;

        host.log(
            log::Level::Info,
            "upload",
            Some(&json!({
                "batch_id": batch_id,
                "index": index,
                "file_name": image.file_name,
                "extension": image.extension,
                "bytes": image.buffer.len(),
            })),
        );

        let outcome = client.upload(&config.api_key, image).await?;

        host.log(
            log::Level::Info,
            "IM.GE upload response",
            Some(&json!({
                "batch_id": batch_id,
                "file_name": image.file_name,
                "response": outcome.raw,
            })),
        );

        image.img_url = Some(outcome.url);
        image.full_result = Some(outcome.raw);
    }

    log::info!("Batch {} uploaded {} images", batch_id, output.len());
    Ok(())
}

fn check_size(image: &ImageRecord, config: &PluginConfig) -> AppResult<()> {
    let size_mb = image.size_mb();
    if size_mb > config.image_max_size {
        return Err(AppError::size_limit(
            &image.file_name,
            size_mb,
            config.image_max_size,
        ));
    }
    Ok(())
}
