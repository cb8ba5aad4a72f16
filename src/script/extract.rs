use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{AssetError, Result};

/// Scenario source formats the converter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// UTF-8 text, one line per line
    PlainText,
    /// Office Open XML document, one line per body paragraph
    WordDocument,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::PlainText),
            "docx" => Some(Self::WordDocument),
            _ => None,
        }
    }
}

/// Read trimmed raw lines from a scenario source file.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    match SourceFormat::from_path(path) {
        Some(SourceFormat::PlainText) => read_txt_lines(path),
        Some(SourceFormat::WordDocument) => read_docx_lines(path),
        None => Err(AssetError::UnsupportedFormat(path.display().to_string())),
    }
}

pub fn read_txt_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    Ok(content.lines().map(|line| line.trim().to_string()).collect())
}

pub fn read_docx_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)
        .map_err(|e| AssetError::Document(format!("{}: {}", path.display(), e)))?;

    let paragraphs = document_paragraphs(&xml)?;
    debug!("Read {} paragraphs from {}", paragraphs.len(), path.display());
    Ok(paragraphs)
}

/// Text of each top-level body paragraph, one entry per soft-broken line.
/// Tables and text boxes are skipped.
fn document_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut nested = 0usize;
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested += 1,
                _ if nested > 0 => {}
                b"w:p" => current = Some(String::new()),
                b"w:r" => run_depth += 1,
                b"w:t" if run_depth > 0 => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                if nested > 0 {
                    continue;
                }
                match e.name().as_ref() {
                    b"w:p" => paragraphs.push(String::new()),
                    b"w:tab" if run_depth > 0 => push_to(&mut current, "\t"),
                    b"w:cr" if run_depth > 0 => push_to(&mut current, "\n"),
                    b"w:br" if run_depth > 0 => {
                        // Page and column breaks carry no text
                        let kind = e.try_get_attribute("w:type").map_err(quick_xml::Error::from)?;
                        let is_layout_break = kind
                            .is_some_and(|attr| matches!(attr.value.as_ref(), b"page" | b"column"));
                        if !is_layout_break {
                            push_to(&mut current, "\n");
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested = nested.saturating_sub(1),
                _ if nested > 0 => {}
                b"w:p" => {
                    // A soft break starts a new visual line
                    if let Some(text) = current.take() {
                        paragraphs.extend(text.split('\n').map(|line| line.trim().to_string()));
                    }
                    run_depth = 0;
                }
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Text(t) if in_text && nested == 0 => {
                let text = t.unescape()?;
                push_to(&mut current, &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_to(current: &mut Option<String>, text: &str) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push_str(text);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    /// Build a minimal .docx holding `body` inside `<w:body>`
    pub(crate) fn write_docx(path: &Path, body: &str) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("word/document.xml", FileOptions::default()).unwrap();
        write!(
            zip,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<w:document xmlns:w=""#,
                "http://schemas.openxmlformats.org/wordprocessingml/2006/main",
                r#"">"#,
                "<w:body>{}</w:body></w:document>",
            ),
            body
        )
        .unwrap();
        zip.finish().unwrap();
    }

    pub(crate) fn paragraph(text: &str) -> String {
        format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", text)
    }

    #[test]
    fn test_source_format_detection() {
        assert_eq!(SourceFormat::from_path(Path::new("a.TXT")), Some(SourceFormat::PlainText));
        assert_eq!(
            SourceFormat::from_path(Path::new("b.docx")),
            Some(SourceFormat::WordDocument)
        );
        assert_eq!(SourceFormat::from_path(Path::new("c.pdf")), None);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_txt_lines_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.txt");
        std::fs::write(&path, "\u{feff}  アキラ「やあ」 \r\n\n\u{3000}地の文。\n").unwrap();

        let lines = read_txt_lines(&path).unwrap();
        assert_eq!(lines, vec!["アキラ「やあ」", "", "地の文。"]);
    }

    #[test]
    fn test_docx_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.docx");
        let body = format!(
            "{}<w:p/>{}<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
             <w:r><w:t>分割</w:t></w:r><w:r><w:t>された&amp;行</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>",
            paragraph(" アキラ「こんにちは。 "),
            paragraph("よろしく。」"),
            paragraph("表の中"),
        );
        write_docx(&path, &body);

        let lines = read_docx_lines(&path).unwrap();
        assert_eq!(
            lines,
            vec!["アキラ「こんにちは。", "", "よろしく。」", "分割された&行"]
        );
    }

    #[test]
    fn test_soft_breaks_split_paragraph_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.docx");
        let body = concat!(
            "<w:p><w:r><w:t>アキラ「こんにちは</w:t><w:br/>",
            "<w:t xml:space=\"preserve\"> 元気？」</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>前</w:t><w:br w:type=\"page\"/><w:t>後</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>風が吹いた。</w:t></w:r></w:p>",
        );
        write_docx(&path, body);

        let lines = read_docx_lines(&path).unwrap();
        assert_eq!(lines, vec!["アキラ「こんにちは", "元気？」", "前後", "風が吹いた。"]);
    }

    #[test]
    fn test_corrupt_docx_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        assert!(matches!(read_docx_lines(&path), Err(AssetError::Zip(_))));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        assert!(matches!(
            read_lines(Path::new("scene.pdf")),
            Err(AssetError::UnsupportedFormat(_))
        ));
    }
}
