use serde::{Deserialize, Serialize};

use super::SubtitleEntry;

pub const DEFAULT_MAX_CHARS_PER_LINE: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTimestamp {
    pub word: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// Spread each entry's duration evenly over its whitespace-separated words.
///
/// This is an approximation for when no per-word timing is available.
pub fn split_into_words(entries: &[SubtitleEntry]) -> Vec<WordTimestamp> {
    let mut words = Vec::new();
    for entry in entries {
        let parts: Vec<&str> = entry.text.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        let step = (entry.end_time - entry.start_time) / parts.len() as f64;
        words.extend(parts.iter().enumerate().map(|(i, word)| WordTimestamp {
            word: (*word).to_string(),
            start_time: entry.start_time + i as f64 * step,
            end_time: entry.start_time + (i + 1) as f64 * step,
        }));
    }
    words
}

/// Pack words into lines of at most `max_chars` characters.
///
/// Words are never split; a word longer than the budget gets a line of its
/// own. Lines take their start from the first word and their end from the
/// last, and are numbered `line-1`, `line-2`, ...
pub fn group_words_into_lines(words: &[WordTimestamp], max_chars: usize) -> Vec<SubtitleEntry> {
    let mut entries = Vec::new();
    let mut line: Vec<&WordTimestamp> = Vec::new();
    let mut length = 0;

    for word in words {
        let added = word.word.chars().count() + usize::from(!line.is_empty());
        if length + added > max_chars && !line.is_empty() {
            entries.push(finish_line(&line, entries.len() + 1));
            line.clear();
            length = 0;
            line.push(word);
            length += word.word.chars().count();
            continue;
        }
        line.push(word);
        length += added;
    }

    if !line.is_empty() {
        entries.push(finish_line(&line, entries.len() + 1));
    }
    entries
}

fn finish_line(words: &[&WordTimestamp], number: usize) -> SubtitleEntry {
    SubtitleEntry {
        id: format!("line-{number}"),
        start_time: words[0].start_time,
        end_time: words[words.len() - 1].end_time,
        text: words
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    }
}
