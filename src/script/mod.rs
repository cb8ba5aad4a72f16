// Scenario text to TyranoScript conversion
//
// The conversion runs as a fixed chain of pure stages:
// - extract: read raw lines from .txt / .docx sources
// - normalize: speaker marker insertion
// - blocks: split at speaker markers
// - paginate: fit block bodies into the message window
// - render: emit the .ks document

pub mod blocks;
pub mod extract;
pub mod normalize;
pub mod paginate;
pub mod render;

use std::io::Write;
use std::path::Path;
use tracing::info;

pub use blocks::{split_blocks, Block};
pub use extract::SourceFormat;
pub use normalize::normalize_lines;
pub use paginate::paginate;
pub use render::render_document;

use crate::error::Result;
use crate::pipeline::output_path;

/// Leading character of a speaker line; alone it switches back to narration
pub const MARKER: char = '#';
pub const OPEN_QUOTE: char = '「';
pub const CLOSE_QUOTE: char = '」';
/// Preferred cut point when a line is too long for one page
pub const SENTENCE_END: char = '。';

/// Message window capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub chars_per_line: usize,
    pub lines_per_page: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            chars_per_line: 38,
            lines_per_page: 3,
        }
    }
}

impl PageLimits {
    /// Characters one page may hold in total
    pub fn char_limit(&self) -> usize {
        self.chars_per_line * self.lines_per_page
    }
}

/// Converts scenario sources into `.ks` files
#[derive(Debug, Clone, Default)]
pub struct ScriptConverter {
    limits: PageLimits,
}

impl ScriptConverter {
    pub fn new(limits: PageLimits) -> Self {
        Self { limits }
    }

    /// Render the `.ks` text for already extracted raw lines.
    pub fn render(&self, raw_lines: &[String], stem: &str) -> String {
        let lines = normalize_lines(raw_lines);
        let blocks = split_blocks(&lines);
        render_document(stem, &blocks, self.limits)
    }

    /// Convert `input` into `dst_dir/<base_name>.ks`.
    ///
    /// Returns `Ok(false)` without touching the filesystem when the input is
    /// not a scenario source. The output is written only once fully rendered.
    pub fn convert(&self, input: &Path, dst_dir: &Path, base_name: &str) -> Result<bool> {
        if SourceFormat::from_path(input).is_none() {
            return Ok(false);
        }

        let raw_lines = extract::read_lines(input)?;
        let stem = Path::new(base_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| base_name.to_string());
        let text = self.render(&raw_lines, &stem);

        let out_path = output_path(dst_dir, base_name, "ks");
        write_atomically(&out_path, &text)?;

        let shown = pathdiff::diff_paths(&out_path, dst_dir).unwrap_or_else(|| out_path.clone());
        info!(
            "[TEXT->KS] {} -> {}",
            input.file_name().unwrap_or_default().to_string_lossy(),
            shown.display()
        );
        Ok(true)
    }
}

/// Write through a temp file in the target directory, then rename over the target.
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut builder = tempfile::Builder::new();
    // Same mode as a plain create; the process umask still applies
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use crate::error::AssetError;

    #[test]
    fn test_convert_txt_writes_ks() {
        let src = assert_fs::TempDir::new().unwrap();
        let dst = assert_fs::TempDir::new().unwrap();
        let input = src.child("第1話.txt");
        input.write_str("アキラ「こんにちは。\nよろしく。」\n\n風が吹いた。\n").unwrap();

        let handled = ScriptConverter::default()
            .convert(input.path(), dst.path(), "dai1wa.txt")
            .unwrap();
        assert!(handled);

        let expected = "[_tb_system_call storage=system/_dai1wa.ks]\n\
[mask time=\"1000\" effect=\"fadeIn\" color=\"0x000000\" ]\n\
[stopbgm time=\"1500\" fadeout=\"true\" ]\n\
[tb_show_message_window ]\n\
[bg time=\"1000\" method=\"crossfade\" storage=\"room.jpg\" ]\n\
[mask_off time=\"1000\" effect=\"fadeOut\" ]\n\
\n\
[tb_start_text mode=3 ]\n\
#アキラ\n\
「こんにちは。[l][r]\n\
よろしく。」[p][r]\n\
[_tb_end_text]\n\
\n\
[tb_start_text mode=3 ]\n\
#\n\
風が吹いた。[p][r]\n\
[_tb_end_text]\n\
[chara_hide_all time=\"1000\" wait=\"true\" ]\n\
[jump storage=\"\" target=\"\" ]\n";
        dst.child("dai1wa.ks").assert(expected);
    }

    #[test]
    fn test_convert_docx_writes_ks() {
        let src = assert_fs::TempDir::new().unwrap();
        let dst = assert_fs::TempDir::new().unwrap();
        let input = src.child("scene.DOCX");
        let body = format!(
            "{}{}",
            extract::tests::paragraph("ユイ「またね」"),
            extract::tests::paragraph("扉が閉まる。")
        );
        extract::tests::write_docx(input.path(), &body);

        let out_dir = dst.child("nested/dir");
        assert!(ScriptConverter::default()
            .convert(input.path(), out_dir.path(), "scene.DOCX")
            .unwrap());

        let ks = std::fs::read_to_string(out_dir.child("scene.ks").path()).unwrap();
        assert!(ks.contains(concat!(
            "#ユイ\n「またね」[p][r]\n[_tb_end_text]\n\n",
            "[tb_start_text mode=3 ]\n#\n扉が閉まる。[p][r]\n",
        )));
    }

    #[test]
    fn test_docx_soft_break_keeps_dialogue_together() {
        let src = assert_fs::TempDir::new().unwrap();
        let dst = assert_fs::TempDir::new().unwrap();
        let input = src.child("scene.docx");
        let body = format!(
            "<w:p><w:r><w:t>アキラ「こんにちは</w:t><w:br/><w:t>元気？」</w:t></w:r></w:p>{}",
            extract::tests::paragraph("風が吹いた。")
        );
        extract::tests::write_docx(input.path(), &body);

        assert!(ScriptConverter::default()
            .convert(input.path(), dst.path(), "scene.docx")
            .unwrap());

        let ks = std::fs::read_to_string(dst.child("scene.ks").path()).unwrap();
        assert!(ks.contains(concat!(
            "#アキラ\n「こんにちは[l][r]\n元気？」[p][r]\n[_tb_end_text]\n\n",
            "[tb_start_text mode=3 ]\n#\n風が吹いた。[p][r]\n",
        )));
    }

    #[cfg(unix)]
    #[test]
    fn test_ks_file_mode_matches_plain_write() {
        use std::os::unix::fs::PermissionsExt;

        let src = assert_fs::TempDir::new().unwrap();
        let dst = assert_fs::TempDir::new().unwrap();
        let input = src.child("scene.txt");
        input.write_str("地の文。\n").unwrap();

        ScriptConverter::default()
            .convert(input.path(), dst.path(), "scene.txt")
            .unwrap();
        let plain = dst.child("plain.txt");
        std::fs::write(plain.path(), "x").unwrap();

        let mode_of = |path: &Path| std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode_of(dst.child("scene.ks").path()), mode_of(plain.path()));
    }

    #[test]
    fn test_unrecognized_extension_is_not_handled() {
        let src = assert_fs::TempDir::new().unwrap();
        let dst = assert_fs::TempDir::new().unwrap();
        let input = src.child("scene.pdf");
        input.write_str("%PDF-1.4").unwrap();

        let handled = ScriptConverter::default()
            .convert(input.path(), dst.path(), "scene.pdf")
            .unwrap();
        assert!(!handled);
        assert_eq!(std::fs::read_dir(dst.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_malformed_source_leaves_no_output() {
        let src = assert_fs::TempDir::new().unwrap();
        let dst = assert_fs::TempDir::new().unwrap();
        let input = src.child("broken.txt");
        input.write_binary(&[0xff, 0xfe, 0x00, 0xd8]).unwrap();

        let result = ScriptConverter::default().convert(input.path(), dst.path(), "broken.txt");
        assert!(matches!(result, Err(AssetError::Io(_))));
        assert_eq!(std::fs::read_dir(dst.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_custom_limits_are_used() {
        let converter = ScriptConverter::new(PageLimits {
            chars_per_line: 2,
            lines_per_page: 2,
        });
        let text = converter.render(&["あいうえおか".to_string()], "x");
        assert!(text.contains("[tb_start_text mode=3 ]\nあいうえ[p][r]\n[_tb_end_text]"));
        assert!(text.contains("[tb_start_text mode=3 ]\nおか[p][r]\n[_tb_end_text]"));
    }
}
