//! ASS (Advanced SubStation Alpha) output.
//!
//! Only generation is supported; ASS files are never read back.

use std::fmt::Write;

use super::timestamp::format_ass_timestamp;
use super::{SubtitleEntry, SubtitleStyle};

/// Style row of an ASS script.
#[derive(Debug, Clone, PartialEq)]
pub struct AssStyle {
    pub name: String,
    pub font_name: String,
    pub font_size: u32,
    /// `&HAABBGGRR`
    pub primary_color: String,
    pub outline_color: String,
    pub bold: bool,
    pub outline: u32,
    /// Numpad layout: 2 is bottom-center, 8 is top-center.
    pub alignment: u8,
}

impl AssStyle {
    pub fn from_subtitle_style(name: &str, style: &SubtitleStyle) -> Self {
        Self {
            name: name.to_string(),
            font_name: style.font_family.clone(),
            font_size: style.font_size,
            primary_color: ass_color(&style.font_color),
            outline_color: ass_color(style.stroke_color.as_deref().unwrap_or("#000000")),
            bold: style.font_weight.is_bold(),
            outline: style.stroke_width.unwrap_or(2),
            alignment: if style.position_y < 0.5 { 8 } else { 2 },
        }
    }

    pub fn to_style_line(&self) -> String {
        format!(
            "Style: {name},{font},{size},{primary},&H000000FF,{outline},&H80000000,{bold},0,0,0,100,100,0,0,1,{outline_w},0,{align},10,10,10,1",
            name = self.name,
            font = self.font_name,
            size = self.font_size,
            primary = self.primary_color,
            outline = self.outline_color,
            bold = if self.bold { -1 } else { 0 },
            outline_w = self.outline,
            align = self.alignment,
        )
    }
}

/// `Style:` line for a subtitle style.
pub fn generate_ass_style(name: &str, style: &SubtitleStyle) -> String {
    AssStyle::from_subtitle_style(name, style).to_style_line()
}

/// Convert `#RRGGBB` to `&H00BBGGRR`. Anything else falls back to white.
pub fn ass_color(hex: &str) -> String {
    let clean = hex.trim_start_matches('#');
    if clean.len() == 6 && clean.chars().all(|c| c.is_ascii_hexdigit()) {
        let (r, g, b) = (&clean[0..2], &clean[2..4], &clean[4..6]);
        return format!("&H00{b}{g}{r}").to_uppercase();
    }
    "&H00FFFFFF".to_string()
}

/// Full ASS script with one dialogue line per entry.
pub fn generate_ass_file(
    entries: &[SubtitleEntry],
    style: &SubtitleStyle,
    play_res: (u32, u32),
) -> String {
    let ass_style = AssStyle::from_subtitle_style("Default", style);
    let mut output = String::new();

    let _ = writeln!(output, "[Script Info]");
    let _ = writeln!(output, "ScriptType: v4.00+");
    let _ = writeln!(output, "PlayResX: {}", play_res.0);
    let _ = writeln!(output, "PlayResY: {}", play_res.1);
    let _ = writeln!(output, "WrapStyle: 0");
    let _ = writeln!(output, "ScaledBorderAndShadow: yes");
    let _ = writeln!(output);

    let _ = writeln!(output, "[V4+ Styles]");
    let _ = writeln!(
        output,
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding"
    );
    let _ = writeln!(output, "{}", ass_style.to_style_line());
    let _ = writeln!(output);

    let _ = writeln!(output, "[Events]");
    let _ = writeln!(
        output,
        "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
    );
    for entry in entries {
        let text = style.text_transform.apply(&entry.text);
        let _ = writeln!(
            output,
            "Dialogue: 0,{start},{end},{style},,0,0,0,,{text}",
            start = format_ass_timestamp(entry.start_time),
            end = format_ass_timestamp(entry.end_time),
            style = ass_style.name,
            text = escape_ass_text(&text)
        );
    }

    output
}

fn escape_ass_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('\n', "\\N")
}
