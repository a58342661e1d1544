use async_trait::async_trait;

use crate::host::{Host, LifecycleHook};
use crate::image::ImageRecord;

/// Markdown image reference for an uploaded image
pub fn markdown_reference(url: &str) -> String {
    format!("![]({})", url)
}

/// After-upload hook that turns each `img_url` into markdown display text
///
/// URLs were checked when the upload response was read, so this only
/// formats. Images without a URL are skipped and the hook always reports
/// success.
pub struct MarkdownLinker;

#[async_trait]
impl LifecycleHook for MarkdownLinker {
    async fn handle(&self, host: &dyn Host, output: &mut [ImageRecord]) -> bool {
        host.log(log::Level::Info, "IM.GE upload finished", None);

        for image in output.iter_mut() {
            if let Some(url) = image.img_url.as_deref().filter(|url| !url.is_empty()) {
                image.display_text = Some(markdown_reference(url));
            }
        }

        true
    }
}
