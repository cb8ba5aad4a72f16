use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::media::MediaProcessorTrait;
use super::{AssetStep, extension_of, output_path};

/// Convert HEIC photos to JPEG; other images pass through to the copy fallback
pub struct HeicImageStep {
    media: Arc<dyn MediaProcessorTrait>,
}

impl HeicImageStep {
    pub fn new(media: Arc<dyn MediaProcessorTrait>) -> Self {
        Self { media }
    }
}

#[async_trait]
impl AssetStep for HeicImageStep {
    fn name(&self) -> &str {
        "heic->jpg"
    }

    async fn apply(&self, input_path: &Path, dst_dir: &Path, base_name: &str) -> Result<bool> {
        if extension_of(input_path).as_deref() != Some("heic") {
            return Ok(false);
        }

        let out_path = output_path(dst_dir, base_name, "jpg");
        tokio::fs::create_dir_all(dst_dir).await?;
        self.media.convert_image(input_path, &out_path).await?;
        Ok(true)
    }
}
