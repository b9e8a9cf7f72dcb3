use crate::error::EditError;
use crate::render::ffmpeg::graph::{Filter, FilterChain, FilterGraph, Label};
use crate::subtitles::{
    SubtitleAnimation, SubtitleConfig, SubtitleEntry, SubtitleStyle, TextAlign, split_into_words,
};
use crate::text::{FontResolver, color_to_ffmpeg};
use crate::transitions::Easing;

use super::util::{alpha_ramp, escape_drawtext, escape_ffmpeg_path, format_number};

/// Fade length used by the `fade` subtitle animation.
const SUBTITLE_FADE: f64 = 0.2;
const DEFAULT_STROKE_WIDTH: u32 = 2;
const DEFAULT_BOX_PADDING: u32 = 10;
const SIDE_MARGIN: u32 = 40;

/// Burn the subtitle entries into `video`, one drawtext per entry.
///
/// Returns `None` when there is nothing to draw.
pub fn burn_subtitles(
    graph: &mut FilterGraph,
    video: &Label,
    subtitles: &SubtitleConfig,
    fonts: &FontResolver,
) -> Result<Option<Label>, EditError> {
    let entries = if subtitles.word_by_word {
        split_into_words(&subtitles.entries)
            .into_iter()
            .enumerate()
            .map(|(i, word)| SubtitleEntry {
                id: format!("word-{}", i + 1),
                start_time: word.start_time,
                end_time: word.end_time,
                text: word.word,
            })
            .collect()
    } else {
        subtitles.entries.clone()
    };

    let mut chain = FilterChain::new();
    for entry in &entries {
        chain.push(entry_filter(entry, &subtitles.style, fonts));
    }
    if chain.is_empty() {
        return Ok(None);
    }

    graph.add(vec![video.into()], chain, "subv").map(Some)
}

/// One drawtext, enabled only inside the entry's window.
pub fn entry_filter(entry: &SubtitleEntry, style: &SubtitleStyle, fonts: &FontResolver) -> Filter {
    let text = style.text_transform.apply(&entry.text).replace(['\r', '\n'], " ");
    let family = fonts.font_with_fallback(&style.font_family);

    let mut filter = Filter::new("drawtext")
        .arg("text", format!("'{}'", escape_drawtext(&text)))
        .arg("font", format!("'{}'", escape_drawtext(&family)))
        .arg("fontsize", style.font_size);
    if let Some(path) = fonts.font_path(&style.font_family, style.font_weight) {
        filter = filter.arg("fontfile", format!("'{}'", escape_ffmpeg_path(&path)));
    }
    filter = filter
        .arg("fontcolor", color_to_ffmpeg(&style.font_color))
        .arg("x", x_expression(style.align))
        .arg("y", format!("h*{}", format_number(style.position_y)));

    if let Some(color) = &style.stroke_color {
        let width = style.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH);
        if width > 0 {
            filter = filter
                .arg("borderw", width)
                .arg("bordercolor", color_to_ffmpeg(color));
        }
    }

    if let Some(color) = &style.background_color {
        filter = filter
            .arg("box", 1)
            .arg("boxcolor", color_to_ffmpeg(color))
            .arg("boxborderw", style.background_padding.unwrap_or(DEFAULT_BOX_PADDING));
    }

    if style.animation == SubtitleAnimation::Fade
        && let Some(ramp) = alpha_ramp(
            entry.start_time,
            Some(entry.end_time),
            SUBTITLE_FADE,
            SUBTITLE_FADE,
            Easing::Linear,
        )
    {
        filter = filter.arg("alpha", format!("'{ramp}'"));
    }

    filter.arg(
        "enable",
        format!(
            "'between(t,{},{})'",
            format_number(entry.start_time),
            format_number(entry.end_time)
        ),
    )
}

fn x_expression(align: TextAlign) -> String {
    match align {
        TextAlign::Center => "(w-text_w)/2".to_string(),
        TextAlign::Left => SIDE_MARGIN.to_string(),
        TextAlign::Right => format!("w-text_w-{SIDE_MARGIN}"),
    }
}
