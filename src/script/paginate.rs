use std::collections::VecDeque;
use tracing::debug;

use super::{PageLimits, SENTENCE_END};

/// What to do with the line at the head of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Accumulate,
    FlushAndRetry,
    ForceSplit,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `s` after its first `n` characters.
fn split_at_char(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((byte_idx, _)) => s.split_at(byte_idx),
        None => (s, ""),
    }
}

/// Cut an overlong line into pieces of at most `limit` characters, preferring
/// to end each piece right after the last `。` that fits.
pub fn split_line_by_punctuation(line: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = line;

    while char_len(rest) > limit {
        let (window, _) = split_at_char(rest, limit);
        let cut = match window.rfind(SENTENCE_END) {
            Some(byte_idx) => byte_idx + SENTENCE_END.len_utf8(),
            None => {
                debug!("No sentence end within {} characters, cutting hard", limit);
                window.len()
            }
        };
        let (head, tail) = rest.split_at(cut);
        pieces.push(head.to_string());
        rest = tail;
    }

    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }
    pieces
}

/// Pack a block body into pages bounded by line count and total characters.
pub fn paginate(body: &[String], limits: PageLimits) -> Vec<Vec<String>> {
    let char_limit = limits.char_limit();
    let mut pages = Vec::new();
    let mut page: Vec<String> = Vec::new();
    let mut page_chars = 0;
    let mut queue: VecDeque<String> = body.iter().cloned().collect();

    while let Some(mut line) = queue.pop_front() {
        if page.is_empty() && char_len(&line) > char_limit {
            let mut pieces = split_line_by_punctuation(&line, char_limit);
            if let Some(last) = pieces.pop() {
                line = last;
            }
            pages.extend(pieces.into_iter().map(|piece| vec![piece]));
        }

        let len = char_len(&line);
        let step = if page.len() + 1 > limits.lines_per_page || page_chars + len > char_limit {
            if page.is_empty() {
                Step::ForceSplit
            } else {
                Step::FlushAndRetry
            }
        } else {
            Step::Accumulate
        };

        match step {
            Step::Accumulate => {
                page.push(line);
                page_chars += len;
            }
            Step::FlushAndRetry => {
                pages.push(std::mem::take(&mut page));
                page_chars = 0;
                queue.push_front(line);
            }
            Step::ForceSplit => {
                let (head, tail) = split_at_char(&line, char_limit);
                if !tail.is_empty() {
                    queue.push_front(tail.to_string());
                }
                pages.push(vec![head.to_string()]);
            }
        }
    }

    if !page.is_empty() {
        pages.push(page);
    }
    pages
}
