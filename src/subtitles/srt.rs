use lazy_static::lazy_static;
use regex::Regex;

use super::SubtitleEntry;
use super::timestamp::{format_srt_timestamp, parse_srt_timestamp};

lazy_static! {
    static ref CUE_TIMING: Regex = Regex::new(
        r"(\d{2}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2}[,.]\d{3})"
    )
    .expect("valid SRT timing pattern");
}

/// One numbered cue as it appears in a subtitle file.
#[derive(Debug, Clone, PartialEq)]
pub struct SrtCue {
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

/// Parse SRT content.
///
/// Blocks with a missing index or an unreadable timing line are skipped so a
/// single corrupt cue does not lose the rest of the file.
pub fn parse_srt(content: &str) -> Vec<SrtCue> {
    let lines: Vec<&str> = content.trim().lines().collect();
    let mut cues = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;
        if line.is_empty() {
            continue;
        }
        let Ok(index) = line.parse::<usize>() else {
            continue;
        };

        let Some(timing) = lines.get(i).map(|l| l.trim()) else {
            break;
        };
        i += 1;
        let Some((start_time, end_time)) = parse_timing(timing) else {
            continue;
        };

        let mut text_lines = Vec::new();
        while let Some(text) = lines.get(i).map(|l| l.trim()) {
            if text.is_empty() {
                break;
            }
            text_lines.push(text);
            i += 1;
        }

        cues.push(SrtCue {
            index,
            start_time,
            end_time,
            text: text_lines.join("\n"),
        });
    }

    cues
}

fn parse_timing(line: &str) -> Option<(f64, f64)> {
    let caps = CUE_TIMING.captures(line)?;
    Some((
        parse_srt_timestamp(&caps[1])?,
        parse_srt_timestamp(&caps[2])?,
    ))
}

/// Render cues, renumbered from 1 in slice order.
pub fn generate_srt(cues: &[SrtCue]) -> String {
    cues.iter()
        .enumerate()
        .map(|(i, cue)| {
            format!(
                "{}\n{} --> {}\n{}",
                i + 1,
                format_srt_timestamp(cue.start_time),
                format_srt_timestamp(cue.end_time),
                cue.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Entries get ids `cue-<index>`.
pub fn cues_to_entries(cues: Vec<SrtCue>) -> Vec<SubtitleEntry> {
    cues.into_iter()
        .map(|cue| SubtitleEntry {
            id: format!("cue-{}", cue.index),
            start_time: cue.start_time,
            end_time: cue.end_time,
            text: cue.text,
        })
        .collect()
}

pub fn entries_to_cues(entries: &[SubtitleEntry]) -> Vec<SrtCue> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| SrtCue {
            index: i + 1,
            start_time: entry.start_time,
            end_time: entry.end_time,
            text: entry.text.clone(),
        })
        .collect()
}
