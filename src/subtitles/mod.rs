//! Subtitle model, file formats and timing utilities.
//!
//! SRT and WebVTT can be read and written; ASS is write-only. Burn-in filters
//! are produced by the render compiler from a [`SubtitleConfig`].

mod ass;
mod srt;
mod timestamp;
mod vtt;
mod words;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::presets::{SubtitlePreset, VideoDimensions, defaults};
use crate::text::{FontWeight, TextTransform};

pub use ass::{AssStyle, ass_color, generate_ass_file, generate_ass_style};
pub use srt::{SrtCue, cues_to_entries, entries_to_cues, generate_srt, parse_srt};
pub use timestamp::{
    format_ass_timestamp, format_srt_timestamp, format_vtt_timestamp, parse_srt_timestamp,
    parse_vtt_timestamp,
};
pub use vtt::{generate_vtt, parse_vtt};
pub use words::{DEFAULT_MAX_CHARS_PER_LINE, WordTimestamp, group_words_into_lines, split_into_words};

/// Gap under which [`merge_subtitles`] joins neighbouring entries.
pub const DEFAULT_MERGE_GAP: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    pub id: String,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleAnimation {
    #[default]
    None,
    Fade,
    Pop,
    Typewriter,
    Highlight,
    Bounce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleStyle {
    pub font_family: String,
    pub font_size: u32,
    /// Hex or `rgb()/rgba()` color.
    pub font_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_padding: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_radius: Option<u32>,
    pub font_weight: FontWeight,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<u32>,
    /// Vertical position of the text, 0 = top, 1 = bottom.
    pub position_y: f64,
    pub align: TextAlign,
    pub text_transform: TextTransform,
    pub animation: SubtitleAnimation,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".into(),
            font_size: 48,
            font_color: "#FFFFFF".into(),
            background_color: None,
            background_padding: None,
            background_radius: None,
            font_weight: FontWeight::Regular,
            stroke_color: None,
            stroke_width: None,
            position_y: 0.85,
            align: TextAlign::Center,
            text_transform: TextTransform::None,
            animation: SubtitleAnimation::None,
        }
    }
}

/// Partial style laid over a preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleStyleOverrides {
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub font_color: Option<String>,
    pub background_color: Option<String>,
    pub background_padding: Option<u32>,
    pub background_radius: Option<u32>,
    pub font_weight: Option<FontWeight>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<u32>,
    pub position_y: Option<f64>,
    pub align: Option<TextAlign>,
    pub text_transform: Option<TextTransform>,
    pub animation: Option<SubtitleAnimation>,
}

impl SubtitleStyleOverrides {
    pub fn apply(&self, mut style: SubtitleStyle) -> SubtitleStyle {
        macro_rules! take {
            ($($field:ident),+ $(,)?) => {
                $(if let Some(value) = &self.$field {
                    style.$field = value.clone();
                })+
            };
        }
        macro_rules! take_opt {
            ($($field:ident),+ $(,)?) => {
                $(if self.$field.is_some() {
                    style.$field = self.$field.clone();
                })+
            };
        }

        take!(font_family, font_size, font_color, font_weight, position_y, align, text_transform, animation);
        take_opt!(background_color, background_padding, background_radius, stroke_color, stroke_width);
        style
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleConfig {
    pub entries: Vec<SubtitleEntry>,
    #[serde(default)]
    pub style: SubtitleStyle,
    /// Burn in one word at a time instead of whole entries.
    #[serde(default)]
    pub word_by_word: bool,
}

/// Entries styled by `preset` (default tiktok) with `overrides` on top.
pub fn create_subtitle_config(
    entries: Vec<SubtitleEntry>,
    preset: Option<SubtitlePreset>,
    overrides: Option<&SubtitleStyleOverrides>,
    word_by_word: bool,
) -> SubtitleConfig {
    let base = preset.unwrap_or(defaults::SUBTITLE_STYLE).style();
    let style = match overrides {
        Some(overrides) => overrides.apply(base),
        None => base,
    };
    SubtitleConfig {
        entries,
        style,
        word_by_word,
    }
}

pub fn create_subtitle_config_from_srt(
    content: &str,
    preset: Option<SubtitlePreset>,
    overrides: Option<&SubtitleStyleOverrides>,
    word_by_word: bool,
) -> SubtitleConfig {
    create_subtitle_config(parse_subtitle_file(content), preset, overrides, word_by_word)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    Ass,
}

impl SubtitleFormat {
    pub fn from_path(path: &Path) -> Result<Self, EditError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "srt" => Ok(SubtitleFormat::Srt),
            "vtt" => Ok(SubtitleFormat::Vtt),
            "ass" => Ok(SubtitleFormat::Ass),
            _ => Err(EditError::UnknownSubtitleFormat(path.display().to_string())),
        }
    }

    /// Content sniffing: a `WEBVTT` header means WebVTT, anything else SRT.
    pub fn detect(content: &str) -> Self {
        if content.trim_start().starts_with("WEBVTT") {
            SubtitleFormat::Vtt
        } else {
            SubtitleFormat::Srt
        }
    }

    pub fn parse(self, content: &str) -> Result<Vec<SubtitleEntry>, EditError> {
        match self {
            SubtitleFormat::Srt => Ok(cues_to_entries(parse_srt(content))),
            SubtitleFormat::Vtt => Ok(cues_to_entries(parse_vtt(content))),
            SubtitleFormat::Ass => Err(EditError::UnknownSubtitleFormat(
                "ASS input is not supported".into(),
            )),
        }
    }

    /// Serialize entries. `style` and `play_res` only matter for ASS.
    pub fn render(
        self,
        entries: &[SubtitleEntry],
        style: &SubtitleStyle,
        play_res: VideoDimensions,
    ) -> String {
        match self {
            SubtitleFormat::Srt => generate_srt(&entries_to_cues(entries)),
            SubtitleFormat::Vtt => generate_vtt(&entries_to_cues(entries)),
            SubtitleFormat::Ass => {
                generate_ass_file(entries, style, (play_res.width, play_res.height))
            }
        }
    }
}

/// Parse SRT or WebVTT, detected from the content.
pub fn parse_subtitle_file(content: &str) -> Vec<SubtitleEntry> {
    let cues = match SubtitleFormat::detect(content) {
        SubtitleFormat::Vtt => parse_vtt(content),
        _ => parse_srt(content),
    };
    cues_to_entries(cues)
}

/// Shift every entry by `offset` seconds, clamping at zero.
pub fn offset_subtitles(entries: &[SubtitleEntry], offset: f64) -> Vec<SubtitleEntry> {
    entries
        .iter()
        .map(|entry| SubtitleEntry {
            start_time: (entry.start_time + offset).max(0.0),
            end_time: (entry.end_time + offset).max(0.0),
            ..entry.clone()
        })
        .collect()
}

/// Stretch timings, e.g. after a speed change.
pub fn scale_subtitles(entries: &[SubtitleEntry], factor: f64) -> Vec<SubtitleEntry> {
    entries
        .iter()
        .map(|entry| SubtitleEntry {
            start_time: entry.start_time * factor,
            end_time: entry.end_time * factor,
            ..entry.clone()
        })
        .collect()
}

/// Join consecutive entries separated by at most `max_gap` seconds.
pub fn merge_subtitles(entries: &[SubtitleEntry], max_gap: f64) -> Vec<SubtitleEntry> {
    let mut merged: Vec<SubtitleEntry> = Vec::new();
    for entry in entries {
        match merged.last_mut() {
            Some(current) if entry.start_time - current.end_time <= max_gap => {
                current.end_time = entry.end_time;
                current.text.push(' ');
                current.text.push_str(&entry.text);
            }
            _ => merged.push(entry.clone()),
        }
    }
    merged
}
