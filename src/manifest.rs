use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{AssetError, Result};

const CHUNK_SIZE: usize = 1024 * 1024;

/// Whether unchanged files are reprocessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessMode {
    /// Only files whose content changed since the last run
    #[default]
    Diff,
    /// Every file
    Full,
}

impl std::fmt::Display for ProcessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Diff => write!(f, "diff"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Drive-relative path to md5 digest of the last processed content
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Load the manifest at `path`; a missing file is an empty manifest.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!("No manifest at {}, starting empty", path.display());
            return Ok(Self { path, entries: BTreeMap::new() });
        }

        let content = std::fs::read_to_string(&path)?;
        let entries = serde_json::from_str(&content)
            .map_err(|e| AssetError::Manifest(format!("{}: {}", path.display(), e)))?;
        Ok(Self { path, entries })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)?;
        info!("Saved manifest with {} entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }

    /// md5 hex digest of the file content
    pub fn fingerprint(path: &Path) -> Result<String> {
        let mut file = File::open(path)?;
        let mut context = md5::Context::new();
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            let read = file.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            context.consume(&buffer[..read]);
        }
        Ok(format!("{:x}", context.compute()))
    }

    pub fn should_process(&self, key: &str, fingerprint: &str, mode: ProcessMode) -> bool {
        match mode {
            ProcessMode::Full => true,
            ProcessMode::Diff => self.entries.get(key).map(String::as_str) != Some(fingerprint),
        }
    }

    pub fn mark_processed(&mut self, key: &str, fingerprint: String) {
        self.entries.insert(key.to_string(), fingerprint);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Forget every entry, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }
}
