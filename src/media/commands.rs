use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{Result, AssetError};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a positional file argument
    pub fn path<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").path(path)
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.path(path)
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Set VBR audio quality
    pub fn audio_quality(self, quality: u8) -> Self {
        self.arg("-qscale:a").arg(quality.to_string())
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);

        let output = cmd.output().map_err(|e| {
            AssetError::Media(format!("Failed to execute {}: {}", self.binary_path, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AssetError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr
            )));
        }

        Ok(())
    }
}

/// Builder for the conversions the asset pipeline runs
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build mp3 transcoding command (ffmpeg)
    pub fn transcode_to_mp3<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: P,
        quality: u8,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "MP3 transcoding")
            .overwrite()
            .input(input_path)
            .no_video()
            .audio_codec("libmp3lame")
            .audio_quality(quality)
            .output(output_path)
    }

    /// Build HEIC to JPEG conversion command (heif-convert)
    pub fn heic_to_jpeg<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: P,
        quality: u8,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "HEIC conversion")
            .arg("-q")
            .arg(quality.to_string())
            .path(input_path)
            .output(output_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check")
            .arg("-version")
    }
}
