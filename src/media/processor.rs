use async_trait::async_trait;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{info, debug};

use crate::config::{ImageConfig, MediaConfig};
use crate::error::{Result, AssetError};
use super::{MediaProcessorTrait, MediaCommandBuilder};

/// Concrete implementation of media processor (ffmpeg + heif-convert)
pub struct MediaProcessorImpl {
    media: MediaConfig,
    image: ImageConfig,
    ffmpeg: MediaCommandBuilder,
    heif: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(media: MediaConfig, image: ImageConfig) -> Self {
        let ffmpeg = MediaCommandBuilder::new(&media.binary_path);
        let heif = MediaCommandBuilder::new(&image.binary_path);

        Self {
            media,
            image,
            ffmpeg,
            heif,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn transcode_audio(&self, input_path: &Path, output_path: &Path) -> Result<()> {
        info!("[FFMPEG] {} -> {}", input_path.display(), output_path.display());

        let command = self.ffmpeg.transcode_to_mp3(input_path, output_path, self.media.mp3_quality);
        command.execute().await?;

        debug!("MP3 transcoding completed");
        Ok(())
    }

    async fn convert_image(&self, input_path: &Path, output_path: &Path) -> Result<()> {
        info!("[HEIC->JPG] {} -> {}", input_path.display(), output_path.display());

        let command = self.heif.heic_to_jpeg(input_path, output_path, self.image.jpeg_quality);
        command.execute().await?;

        debug!("HEIC conversion completed");
        Ok(())
    }

    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.media.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| AssetError::Media(format!("Media processor not found: {}", e)))?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(AssetError::Media("Media processor version check failed".to_string()))
        }
    }

    fn image_converter_available(&self) -> bool {
        // heif-convert has no reliable version flag; being able to spawn it is enough
        Command::new(&self.image.binary_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let output = Command::new(&self.media.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| AssetError::Media(format!("Failed to execute media processor: {}", e)))?;

        if output.status.success() {
            let version_info = String::from_utf8_lossy(&output.stdout);
            // Extract the first line which typically contains the version
            let first_line = version_info.lines().next().unwrap_or("Unknown version");
            Ok(first_line.to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(AssetError::Media(format!("Media processor version check failed: {}", stderr)))
        }
    }
}
