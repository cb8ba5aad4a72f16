use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mirror the drive export into the project asset tree
    Process {
        /// Root of the downloaded drive folders (defaults to paths.src_root)
        #[arg(short, long)]
        src_root: Option<PathBuf>,

        /// Project data directory (defaults to paths.dst_root)
        #[arg(short, long)]
        dst_root: Option<PathBuf>,

        /// Processing mode: diff skips unchanged files, full reprocesses all
        #[arg(short, long, default_value = "diff")]
        mode: String,
    },

    /// Convert one scenario file (.txt or .docx) to TyranoScript
    Convert {
        /// Input scenario file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory the .ks file is written to
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Output file name (extension is replaced by .ks)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Inspect or reset the processed-file manifest
    Manifest {
        #[command(subcommand)]
        action: ManifestAction,
    },

    /// Check that the external converters are installed
    Check,

    /// Write the default configuration to a file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ManifestAction {
    /// List recorded files and their digests
    List,

    /// Show manifest location and entry count
    Info,

    /// Forget every entry so the next diff run reprocesses everything
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_defaults() {
        let args = Args::try_parse_from(["tyrano-assets", "process"]).unwrap();
        match args.command {
            Commands::Process { src_root, dst_root, mode } => {
                assert!(src_root.is_none());
                assert!(dst_root.is_none());
                assert_eq!(mode, "diff");
            }
            _ => panic!("expected process"),
        }
    }

    #[test]
    fn test_global_flags_and_manifest_action() {
        let args = Args::try_parse_from([
            "tyrano-assets", "--verbose", "--config", "my.toml", "manifest", "clear",
        ])
        .unwrap();
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("my.toml")));
        assert!(matches!(args.command, Commands::Manifest { action: ManifestAction::Clear }));
    }

    #[test]
    fn test_convert_requires_input() {
        assert!(Args::try_parse_from(["tyrano-assets", "convert", "--output-dir", "out"]).is_err());
    }
}
