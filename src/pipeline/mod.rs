// Per-asset handler chains
//
// Every asset kind owns an ordered chain of steps. Each step decides from the
// input file whether it applies; the first one that does ends the chain, and
// a file no step claims is copied verbatim.
//
// To add a conversion:
// 1. Implement AssetStep for it
// 2. Put it in the chain built by PipelineFactory for its asset kind

pub mod audio;
pub mod image;
pub mod text;

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub use audio::AudioTranscodeStep;
pub use image::HeicImageStep;
pub use text::ScriptStep;

use crate::error::Result;
use crate::media::MediaProcessorTrait;
use crate::script::ScriptConverter;

/// One conversion in a handler chain
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStep: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// Convert `input_path` into `dst_dir`, naming the output after `base_name`.
    ///
    /// Returns `Ok(false)` when the input is not for this step.
    async fn apply(&self, input_path: &Path, dst_dir: &Path, base_name: &str) -> Result<bool>;
}

/// How a file left the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Converted(String),
    Copied,
}

/// Ordered handler chain with a verbatim copy fallback
pub struct Pipeline {
    kind: AssetKind,
    steps: Vec<Box<dyn AssetStep>>,
}

impl Pipeline {
    pub fn new(kind: AssetKind, steps: Vec<Box<dyn AssetStep>>) -> Self {
        Self { kind, steps }
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub async fn run(
        &self,
        input_path: &Path,
        dst_dir: &Path,
        base_name: &str,
    ) -> Result<StepOutcome> {
        for step in &self.steps {
            if step.apply(input_path, dst_dir, base_name).await? {
                return Ok(StepOutcome::Converted(step.name().to_string()));
            }
        }

        copy_as_is(input_path, &dst_dir.join(base_name)).await?;
        info!("[COPY] {} -> {}", input_path.display(), dst_dir.join(base_name).display());
        Ok(StepOutcome::Copied)
    }
}

/// Copy `src` to `dst`, creating parent directories and keeping the
/// modification time.
pub async fn copy_as_is(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    if src.is_file() {
        tokio::fs::copy(src, dst).await?;
        let modified = tokio::fs::metadata(src).await?.modified()?;
        let target = tokio::fs::OpenOptions::new().write(true).open(dst).await?;
        target.into_std().await.set_modified(modified)?;
    }
    Ok(())
}

/// Asset categories mirrored from the shared drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Bgm,
    Text,
    Image,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bgm => write!(f, "bgm"),
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// Factory for the standard handler chains
pub struct PipelineFactory {
    media: Arc<dyn MediaProcessorTrait>,
    script: ScriptConverter,
}

impl PipelineFactory {
    pub fn new(media: Arc<dyn MediaProcessorTrait>, script: ScriptConverter) -> Self {
        Self { media, script }
    }

    pub fn create_pipeline(&self, kind: AssetKind) -> Pipeline {
        let steps: Vec<Box<dyn AssetStep>> = match kind {
            AssetKind::Bgm => vec![Box::new(AudioTranscodeStep::new(self.media.clone()))],
            AssetKind::Text => vec![Box::new(ScriptStep::new(self.script.clone()))],
            AssetKind::Image => vec![Box::new(HeicImageStep::new(self.media.clone()))],
        };
        Pipeline::new(kind, steps)
    }
}

/// `dst_dir/<base_name with its extension replaced by extension>`
pub fn output_path(dst_dir: &Path, base_name: &str, extension: &str) -> PathBuf {
    let name = Path::new(base_name).with_extension(extension);
    dst_dir.join(name.file_name().unwrap_or(name.as_os_str()))
}

/// Lower-cased extension of `path`, without the dot
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}
