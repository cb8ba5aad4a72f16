use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{AssetError, Result};
use crate::manifest::{Manifest, ProcessMode};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::pipeline::{AssetKind, Pipeline, PipelineFactory, StepOutcome};
use crate::romanize::romanize_filename;
use crate::script::ScriptConverter;

/// One drive folder and where its converted files go
pub struct AssetRoute {
    pub source_dir: String,
    pub dest: PathBuf,
    pub pipeline: Pipeline,
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub mode: ProcessMode,
}

pub struct Workflow {
    config: Config,
    routes: Vec<AssetRoute>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let media =
            MediaProcessorFactory::create_processor(config.media.clone(), config.image.clone());

        // Text conversion works without ffmpeg, so a missing binary is only a warning
        if let Err(e) = media.check_availability() {
            warn!("{}; audio conversion will fail", e);
        }

        Ok(Self::with_media(config, media))
    }

    /// Build a workflow around an existing media processor
    pub fn with_media(config: Config, media: Arc<dyn MediaProcessorTrait>) -> Self {
        let factory = PipelineFactory::new(media, ScriptConverter::new(config.script.limits()));
        let assets = &config.assets;
        let routes = vec![
            AssetRoute {
                source_dir: assets.bgm_source.clone(),
                dest: assets.bgm_dest.clone(),
                pipeline: factory.create_pipeline(AssetKind::Bgm),
            },
            AssetRoute {
                source_dir: assets.text_source.clone(),
                dest: assets.text_dest.clone(),
                pipeline: factory.create_pipeline(AssetKind::Text),
            },
            AssetRoute {
                source_dir: assets.image_source.clone(),
                dest: assets.image_dest.clone(),
                pipeline: factory.create_pipeline(AssetKind::Image),
            },
        ];

        Self { config, routes }
    }

    /// Mirror every configured drive folder into the project tree
    pub async fn process_tree<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        src_root: P,
        dst_root: Q,
        mode: ProcessMode,
    ) -> Result<ProcessSummary> {
        let src_root = src_root.as_ref();
        let dst_root = dst_root.as_ref();

        if !src_root.is_dir() {
            return Err(AssetError::FileNotFound(src_root.display().to_string()));
        }

        let mut manifest = Manifest::load(&self.config.paths.manifest_path)?;
        let mut summary = ProcessSummary { mode, ..Default::default() };
        let mut touched = false;

        for route in &self.routes {
            let src_dir = src_root.join(&route.source_dir);
            let dst_dir_root = if route.dest.is_absolute() {
                route.dest.clone()
            } else {
                dst_root.join(&route.dest)
            };

            if !src_dir.exists() {
                info!("[SKIP] {} not found", src_dir.display());
                continue;
            }

            fs::create_dir_all(&dst_dir_root).await?;
            info!(
                "[PROC] {} src={} -> dst={}",
                route.pipeline.kind(),
                src_dir.display(),
                dst_dir_root.display()
            );

            let files: Vec<PathBuf> = WalkDir::new(&src_dir)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .collect();

            let progress = ProgressBar::new(files.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{prefix:>6} [{bar:30}] {pos}/{len} {wide_msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            progress.set_prefix(route.pipeline.kind().to_string());

            for in_path in files {
                let file_name = in_path.file_name().unwrap_or_default();
                progress.set_message(file_name.to_string_lossy().into_owned());

                let result = self
                    .process_file(
                        &in_path,
                        src_root,
                        &src_dir,
                        &dst_dir_root,
                        &route.pipeline,
                        &manifest,
                        mode,
                    )
                    .await;
                match result {
                    Ok(Some((key, fingerprint))) => {
                        manifest.mark_processed(&key, fingerprint);
                        summary.processed += 1;
                        touched = true;
                    }
                    Ok(None) => summary.skipped += 1,
                    Err(e) => {
                        warn!("Failed to process {}: {}", in_path.display(), e);
                        summary.failed += 1;
                    }
                }
                progress.inc(1);
            }
            progress.finish_and_clear();
        }

        if touched {
            manifest.save()?;
        }

        info!(
            "[DONE] processed={}, skipped={}, failed={}, mode={}",
            summary.processed, summary.skipped, summary.failed, summary.mode
        );
        Ok(summary)
    }

    /// Convert a single scenario file outside the drive tree
    pub async fn convert_text(
        &self,
        input: &Path,
        output_dir: &Path,
        name: Option<&str>,
    ) -> Result<PathBuf> {
        if !input.is_file() {
            return Err(AssetError::FileNotFound(input.display().to_string()));
        }

        let file_name = match name {
            Some(name) => name.to_string(),
            None => romanize_filename(&input.file_name().unwrap_or_default().to_string_lossy()),
        };

        let converter = ScriptConverter::new(self.config.script.limits());
        if !converter.convert(input, output_dir, &file_name)? {
            return Err(AssetError::UnsupportedFormat(format!(
                "{} is not a .txt or .docx file",
                input.display()
            )));
        }
        Ok(crate::pipeline::output_path(output_dir, &file_name, "ks"))
    }

    /// Run one file through its pipeline.
    ///
    /// Returns the manifest key and digest to record, or `None` when the file
    /// is unchanged since the last run.
    #[allow(clippy::too_many_arguments)]
    async fn process_file(
        &self,
        in_path: &Path,
        src_root: &Path,
        src_dir: &Path,
        dst_dir_root: &Path,
        pipeline: &Pipeline,
        manifest: &Manifest,
        mode: ProcessMode,
    ) -> Result<Option<(String, String)>> {
        let rel_path = relative_to(in_path, src_dir)?;
        let dst_dir = match rel_path.parent() {
            Some(parent) => dst_dir_root.join(parent),
            None => dst_dir_root.to_path_buf(),
        };

        let key = manifest_key(in_path, src_root)?;
        let fingerprint = Manifest::fingerprint(in_path)?;
        if !manifest.should_process(&key, &fingerprint, mode) {
            return Ok(None);
        }

        fs::create_dir_all(&dst_dir).await?;
        let file_name = in_path.file_name().unwrap_or_default().to_string_lossy();
        let base_name = romanize_filename(&file_name);

        match pipeline.run(in_path, &dst_dir, &base_name).await? {
            StepOutcome::Converted(step) => info!("{} handled {}", step, key),
            StepOutcome::Copied => {}
        }

        Ok(Some((key, fingerprint)))
    }
}

/// Drive-relative path with `/` separators, stable across platforms
pub fn manifest_key(in_path: &Path, src_root: &Path) -> Result<String> {
    let rel = relative_to(in_path, src_root)?;
    Ok(rel.to_string_lossy().replace('\\', "/"))
}

fn relative_to(path: &Path, base: &Path) -> Result<PathBuf> {
    pathdiff::diff_paths(path, base).ok_or_else(|| {
        AssetError::Config(format!("{} is outside {}", path.display(), base.display()))
    })
}
