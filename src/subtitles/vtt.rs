use lazy_static::lazy_static;
use regex::Regex;

use super::srt::SrtCue;
use super::timestamp::{format_vtt_timestamp, parse_vtt_timestamp};

lazy_static! {
    static ref CUE_TIMING: Regex = Regex::new(
        r"((?:\d{2}:)?\d{2}:\d{2}\.\d{3})\s*-->\s*((?:\d{2}:)?\d{2}:\d{2}\.\d{3})"
    )
    .expect("valid WebVTT timing pattern");
    static ref INLINE_TAG: Regex = Regex::new(r"<[^>]*>").expect("valid tag pattern");
}

/// Parse WebVTT content. Cues are numbered from 1 in file order.
///
/// Inline markup (`<b>`, `<c.yellow>`, voice spans) is stripped and `&nbsp;`
/// becomes a plain space. Cues left without text are dropped.
pub fn parse_vtt(content: &str) -> Vec<SrtCue> {
    let lines: Vec<&str> = content.trim().lines().collect();
    let mut cues = Vec::new();
    let mut i = lines
        .iter()
        .position(|line| line.contains("-->"))
        .unwrap_or(lines.len());

    while i < lines.len() {
        let Some(caps) = CUE_TIMING.captures(lines[i].trim()) else {
            i += 1;
            continue;
        };
        i += 1;

        let mut text_lines = Vec::new();
        while let Some(line) = lines.get(i) {
            if line.trim().is_empty() || line.contains("-->") {
                break;
            }
            let clean = strip_markup(line.trim());
            if !clean.is_empty() {
                text_lines.push(clean);
            }
            i += 1;
        }

        let (Some(start_time), Some(end_time)) =
            (parse_vtt_timestamp(&caps[1]), parse_vtt_timestamp(&caps[2]))
        else {
            continue;
        };
        if text_lines.is_empty() {
            continue;
        }

        cues.push(SrtCue {
            index: cues.len() + 1,
            start_time,
            end_time,
            text: text_lines.join("\n"),
        });
    }

    cues
}

fn strip_markup(line: &str) -> String {
    INLINE_TAG
        .replace_all(line, "")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

pub fn generate_vtt(cues: &[SrtCue]) -> String {
    let body = cues
        .iter()
        .map(|cue| {
            format!(
                "{} --> {}\n{}",
                format_vtt_timestamp(cue.start_time),
                format_vtt_timestamp(cue.end_time),
                cue.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("WEBVTT\n\n{body}")
}
