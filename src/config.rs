use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, AssetError};
use crate::script::PageLimits;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub assets: AssetsConfig,
    pub script: ScriptConfig,
    pub media: MediaConfig,
    pub image: ImageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Local mirror of the shared drive
    pub src_root: PathBuf,
    /// Root of the engine project tree
    pub dst_root: PathBuf,
    /// Processed-file manifest location
    pub manifest_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Drive folder holding background music
    pub bgm_source: String,
    /// Drive folder holding scenario text
    pub text_source: String,
    /// Drive folder holding images
    pub image_source: String,
    /// Destination of converted music, relative to `dst_root` unless absolute
    pub bgm_dest: PathBuf,
    pub text_dest: PathBuf,
    pub image_dest: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Characters one message-window line holds
    pub chars_per_line: usize,
    /// Lines one message-window page holds
    pub lines_per_page: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// libmp3lame VBR quality (0 = best, 9 = worst)
    pub mp3_quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Path to the HEIC decoder (libheif's heif-convert)
    pub binary_path: String,
    /// JPEG quality passed to the decoder
    pub jpeg_quality: u8,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src_root: PathBuf::from("temp_drive"),
            dst_root: PathBuf::from("data"),
            manifest_path: PathBuf::from("data/.asset_manifest.json"),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            bgm_source: "音楽".to_string(),
            text_source: "テキスト".to_string(),
            image_source: "画像".to_string(),
            bgm_dest: PathBuf::from("assets/bgm"),
            text_dest: PathBuf::from("assets/scenario"),
            image_dest: PathBuf::from("assets/image"),
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        let limits = PageLimits::default();
        Self {
            chars_per_line: limits.chars_per_line,
            lines_per_page: limits.lines_per_page,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            mp3_quality: 2,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            binary_path: "heif-convert".to_string(),
            jpeg_quality: 95,
        }
    }
}

impl ScriptConfig {
    pub fn limits(&self) -> PageLimits {
        PageLimits {
            chars_per_line: self.chars_per_line,
            lines_per_page: self.lines_per_page,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AssetError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AssetError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AssetError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| AssetError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Reject limits the paginator cannot make progress with
    pub fn validate(&self) -> Result<()> {
        if self.script.chars_per_line == 0 || self.script.lines_per_page == 0 {
            return Err(AssetError::Config(format!(
                "script.chars_per_line and script.lines_per_page must be at least 1 \
                 (got {} and {})",
                self.script.chars_per_line, self.script.lines_per_page
            )));
        }
        if self.media.mp3_quality > 9 {
            return Err(AssetError::Config(format!(
                "media.mp3_quality must be between 0 and 9 (got {})",
                self.media.mp3_quality
            )));
        }
        if self.image.jpeg_quality > 100 {
            return Err(AssetError::Config(format!(
                "image.jpeg_quality must be between 0 and 100 (got {})",
                self.image.jpeg_quality
            )));
        }
        Ok(())
    }

    /// Drive folder names can be overridden from the environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(dir) = lookup("DRIVE_BGM_DIR") {
            self.assets.bgm_source = dir;
        }
        if let Some(dir) = lookup("DRIVE_TEXT_DIR") {
            self.assets.text_source = dir;
        }
        if let Some(dir) = lookup("DRIVE_IMAGE_DIR") {
            self.assets.image_source = dir;
        }
    }
}
