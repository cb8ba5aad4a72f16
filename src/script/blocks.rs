use super::MARKER;

/// A speaker-delimited run of content lines
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    /// The marker line that opened the block, `None` for leading narration
    pub header: Option<String>,
    pub body: Vec<String>,
}

impl Block {
    fn is_empty(&self) -> bool {
        self.header.is_none() && self.body.is_empty()
    }
}

/// Partition normalized lines at marker boundaries.
pub fn split_blocks<S: AsRef<str>>(lines: &[S]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current = Block::default();

    for line in lines.iter().map(AsRef::as_ref) {
        if line.starts_with(MARKER) {
            let finished = std::mem::replace(
                &mut current,
                Block {
                    header: Some(line.to_string()),
                    body: Vec::new(),
                },
            );
            if !finished.is_empty() {
                blocks.push(finished);
            }
        } else {
            current.body.push(line.to_string());
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(header: Option<&str>, body: &[&str]) -> Block {
        Block {
            header: header.map(str::to_string),
            body: body.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_leading_narration_forms_headerless_block() {
        let blocks = split_blocks(&["朝だ。", "鳥が鳴く。", "#アキラ", "「起きて」", "#"]);
        assert_eq!(
            blocks,
            vec![
                block(None, &["朝だ。", "鳥が鳴く。"]),
                block(Some("#アキラ"), &["「起きて」"]),
                block(Some("#"), &[]),
            ]
        );
    }

    #[test]
    fn test_consecutive_markers_keep_empty_blocks() {
        let blocks = split_blocks(&["#", "#ユイ", "「うん」"]);
        assert_eq!(
            blocks,
            vec![block(Some("#"), &[]), block(Some("#ユイ"), &["「うん」"])]
        );
    }

    #[test]
    fn test_empty_input_has_no_blocks() {
        let empty: [&str; 0] = [];
        assert!(split_blocks(&empty).is_empty());
    }
}
