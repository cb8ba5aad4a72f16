use regex::Regex;
use std::sync::LazyLock;

use super::{CLOSE_QUOTE, MARKER, OPEN_QUOTE};

/// `name「rest` with the speaker captured lazily up to the first opening quote
static SPEAKER_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)「(.*)").expect("speaker pattern is a valid regex")
});

/// Drop empty lines, split inline speakers onto their own marker line and
/// close attributed speech with a bare marker.
pub fn normalize_lines<S: AsRef<str>>(raw_lines: &[S]) -> Vec<String> {
    let mut split: Vec<String> = Vec::with_capacity(raw_lines.len());

    for line in raw_lines.iter().map(AsRef::as_ref).filter(|l| !l.is_empty()) {
        match SPEAKER_INLINE.captures(line) {
            Some(caps) => {
                let speaker = &caps[1];
                if speaker.starts_with(MARKER) {
                    split.push(speaker.to_string());
                } else {
                    split.push(format!("{}{}", MARKER, speaker));
                }
                split.push(format!("{}{}", OPEN_QUOTE, &caps[2]));
            }
            None => split.push(line.to_string()),
        }
    }

    let mut out = Vec::with_capacity(split.len());
    for (idx, line) in split.iter().enumerate() {
        out.push(line.clone());
        if line.ends_with(CLOSE_QUOTE) {
            let next = split.get(idx + 1).map(String::as_str).unwrap_or("");
            if !next.starts_with(OPEN_QUOTE) {
                out.push(MARKER.to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_speaker_is_split_and_closed() {
        let lines = normalize_lines(&["アキラ「こんにちは。", "よろしく。」"]);
        assert_eq!(lines, vec!["#アキラ", "「こんにちは。", "よろしく。」", "#"]);
    }

    #[test]
    fn test_existing_marker_is_not_doubled() {
        let lines = normalize_lines(&["#アキラ「来週までに脚本を。」"]);
        assert_eq!(lines, vec!["#アキラ", "「来週までに脚本を。」", "#"]);
    }

    #[test]
    fn test_consecutive_quotes_share_the_speaker() {
        let lines = normalize_lines(&["ユイ「おはよう」", "「今日は晴れだね」", "空は青い。"]);
        assert_eq!(
            lines,
            vec!["#ユイ", "「おはよう」", "「今日は晴れだね」", "#", "空は青い。"]
        );
    }

    #[test]
    fn test_empty_and_plain_lines() {
        let lines = normalize_lines(&["", "地の文。", "", "#", "続き。"]);
        assert_eq!(lines, vec!["地の文。", "#", "続き。"]);
    }

    #[test]
    fn test_line_starting_with_quote_passes_through() {
        // The speaker group needs at least one character before the quote
        let lines = normalize_lines(&["「独り言」"]);
        assert_eq!(lines, vec!["「独り言」", "#"]);
    }

    #[test]
    fn test_closing_quote_always_followed_by_quote_or_bare_marker() {
        let raw = [
            "先生「静かに」",
            "はい。」",
            "「だって」",
            "ケン「え」",
            "地の文」",
        ];
        let lines = normalize_lines(&raw);
        for (idx, line) in lines.iter().enumerate() {
            if line.ends_with(CLOSE_QUOTE) && !line.starts_with(MARKER) {
                let next = &lines[idx + 1];
                assert!(
                    next.starts_with(OPEN_QUOTE) || next == "#",
                    "{:?} followed by {:?}",
                    line,
                    next
                );
            }
        }
    }
}
