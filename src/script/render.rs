use super::blocks::Block;
use super::paginate::paginate;
use super::PageLimits;

const PROLOGUE: &[&str] = &[
    r#"[mask time="1000" effect="fadeIn" color="0x000000" ]"#,
    r#"[stopbgm time="1500" fadeout="true" ]"#,
    "[tb_show_message_window ]",
    r#"[bg time="1000" method="crossfade" storage="room.jpg" ]"#,
    r#"[mask_off time="1000" effect="fadeOut" ]"#,
];

const EPILOGUE: &[&str] = &[
    r#"[chara_hide_all time="1000" wait="true" ]"#,
    r#"[jump storage="" target="" ]"#,
];

const TEXT_START: &str = "[tb_start_text mode=3 ]";
const TEXT_END: &str = "[_tb_end_text]";
/// Keep the window open and continue on the next line
const CONTINUE: &str = "[l][r]";
/// Wait for a click, then clear the window
const PAGE_BREAK: &str = "[p][r]";

/// Render every block as one text region per page.
pub fn render_blocks(blocks: &[Block], limits: PageLimits) -> String {
    let mut parts: Vec<String> = Vec::new();

    for block in blocks {
        let pages = paginate(&block.body, limits);
        if pages.is_empty() {
            // A header with nothing under it still switches the name box
            push_region(&mut parts, block.header.as_deref(), &[]);
        }
        for page in &pages {
            push_region(&mut parts, block.header.as_deref(), page);
        }
    }

    let mut text = parts.join("\n").trim_end().to_string();
    text.push('\n');
    text
}

fn push_region(parts: &mut Vec<String>, header: Option<&str>, page: &[String]) {
    parts.push(TEXT_START.to_string());
    if let Some(header) = header {
        parts.push(header.to_string());
    }
    if let Some((last, rest)) = page.split_last() {
        for line in rest {
            parts.push(format!("{}{}", line, CONTINUE));
        }
        parts.push(format!("{}{}", last, PAGE_BREAK));
    }
    parts.push(TEXT_END.to_string());
    parts.push(String::new());
}

/// Assemble the complete scenario file for `stem`.
pub fn render_document(stem: &str, blocks: &[Block], limits: PageLimits) -> String {
    let mut doc = format!("[_tb_system_call storage=system/_{}.ks]\n", stem);
    doc.push_str(&PROLOGUE.join("\n"));
    doc.push_str("\n\n");
    doc.push_str(&render_blocks(blocks, limits));
    doc.push_str(&EPILOGUE.join("\n"));
    doc.push('\n');
    doc
}
