use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::media::MediaProcessorTrait;
use super::{AssetStep, extension_of, output_path};

/// Extensions treated as audio; anything else is left to the next step
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg", "m4a", "aac", "wma", "aiff"];

/// Transcode background music to mp3
pub struct AudioTranscodeStep {
    media: Arc<dyn MediaProcessorTrait>,
}

impl AudioTranscodeStep {
    pub fn new(media: Arc<dyn MediaProcessorTrait>) -> Self {
        Self { media }
    }

    pub fn is_audio_file(path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// True when `output` exists and is not older than `input`
fn is_up_to_date(input: &Path, output: &Path) -> Result<bool> {
    if !output.exists() {
        return Ok(false);
    }
    let input_modified = std::fs::metadata(input)?.modified()?;
    let output_modified = std::fs::metadata(output)?.modified()?;
    Ok(output_modified >= input_modified)
}

#[async_trait]
impl AssetStep for AudioTranscodeStep {
    fn name(&self) -> &str {
        "audio->mp3"
    }

    async fn apply(&self, input_path: &Path, dst_dir: &Path, base_name: &str) -> Result<bool> {
        if !Self::is_audio_file(input_path) {
            return Ok(false);
        }

        let out_path = output_path(dst_dir, base_name, "mp3");
        tokio::fs::create_dir_all(dst_dir).await?;

        if is_up_to_date(input_path, &out_path)? {
            info!("[SKIP] up-to-date: {}", out_path.display());
            return Ok(true);
        }

        self.media.transcode_audio(input_path, &out_path).await?;
        Ok(true)
    }
}
