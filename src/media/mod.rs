// External converter plumbing
//
// This module wraps the command line converters the asset pipeline relies on:
// - Processor: runs conversions through the configured binaries
// - Commands: command builders and execution

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub use commands::*;
pub use processor::*;

use crate::config::{ImageConfig, MediaConfig};
use crate::error::Result;

/// Main trait for media conversion operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Transcode an audio file to mp3
    async fn transcode_audio(&self, input_path: &Path, output_path: &Path) -> Result<()>;

    /// Convert a HEIC image to JPEG
    async fn convert_image(&self, input_path: &Path, output_path: &Path) -> Result<()>;

    /// Check if the audio converter is available
    fn check_availability(&self) -> Result<()>;

    /// Check if the image converter can be spawned
    fn image_converter_available(&self) -> bool;

    /// Get audio converter version information
    async fn get_version_info(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation
    pub fn create_processor(
        media: MediaConfig,
        image: ImageConfig,
    ) -> Arc<dyn MediaProcessorTrait> {
        Arc::new(processor::MediaProcessorImpl::new(media, image))
    }
}
