use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Hiragana, katakana and common kanji
static JAPANESE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ぁ-んァ-ヴー一-龠]").expect("japanese character class is a valid regex")
});

/// Transliterate a Japanese file stem to romaji, keeping the extension.
///
/// The engine loads assets by name, so drive files named in Japanese are
/// renamed to plain romaji. Names without Japanese characters are returned
/// unchanged.
pub fn romanize_filename(name: &str) -> String {
    let path = Path::new(name);
    let (stem, ext) = match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => (
            stem.to_string_lossy().into_owned(),
            format!(".{}", ext.to_string_lossy()),
        ),
        _ => (name.to_string(), String::new()),
    };

    if !JAPANESE.is_match(&stem) {
        return format!("{}{}", stem, ext);
    }

    let stem: String = stem.nfc().collect();
    let romaji: String = kakasi::convert(&stem)
        .romaji
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("{}{}", romaji, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_name_is_unchanged() {
        assert_eq!(romanize_filename("room.jpg"), "room.jpg");
        assert_eq!(romanize_filename("theme song.WAV"), "theme song.WAV");
        assert_eq!(romanize_filename("README"), "README");
    }

    #[test]
    fn test_japanese_stem_is_transliterated() {
        let name = romanize_filename("第一話 はじまり.txt");
        assert!(name.ends_with(".txt"));
        assert!(!JAPANESE.is_match(&name), "still japanese: {}", name);
        assert!(!name.contains(' '));
    }

    #[test]
    fn test_kana_only_name() {
        let name = romanize_filename("さくら.heic");
        assert_eq!(name, "sakura.heic");
    }
}
