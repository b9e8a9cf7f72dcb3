use crate::clip::Clip;
use crate::error::EditError;
use crate::presets::VideoDimensions;
use crate::render::ffmpeg::graph::{Filter, FilterChain, FilterGraph, Label, Pad};

use super::util::format_number;

pub const SAMPLE_RATE: u32 = 44_100;
pub const CHANNEL_LAYOUT: &str = "stereo";

/// Normalize one clip into `[v{i}]` and `[a{i}]`.
///
/// Every clip is letterboxed to the target size and resampled to the same
/// frame rate, pixel format and audio layout; concat and xfade refuse
/// mismatched streams.
pub fn process_clip(
    graph: &mut FilterGraph,
    index: usize,
    input: usize,
    clip: &Clip,
    target: VideoDimensions,
    fps: u32,
) -> Result<(Label, Label), EditError> {
    let video = graph.add(
        vec![Pad::video(input)],
        video_chain(clip, target, fps),
        &format!("v{index}"),
    )?;

    let audio_name = format!("a{index}");
    let duration = clip.effective_duration();
    let audio = if clip.muted && duration > 0.0 {
        let chain = FilterChain::new()
            .then(
                Filter::new("anullsrc")
                    .arg("channel_layout", CHANNEL_LAYOUT)
                    .arg("sample_rate", SAMPLE_RATE),
            )
            .then(Filter::new("atrim").arg("duration", format_number(duration)))
            .then(audio_format());
        graph.add(Vec::new(), chain, &audio_name)?
    } else {
        graph.add(vec![Pad::audio(input)], audio_chain(clip), &audio_name)?
    };

    Ok((video, audio))
}

fn video_chain(clip: &Clip, target: VideoDimensions, fps: u32) -> FilterChain {
    let mut chain = FilterChain::new();
    if let Some((start, end)) = clip.trim_window() {
        chain.push(
            Filter::new("trim")
                .arg("start", format_number(start))
                .arg("end", format_number(end)),
        );
        // timestamps must restart at zero or every later xfade offset drifts
        chain.push(Filter::new("setpts").positional("PTS-STARTPTS"));
    }

    let (width, height) = (target.width, target.height);
    chain
        .then(
            Filter::new("scale")
                .positional(width)
                .positional(height)
                .arg("force_original_aspect_ratio", "decrease"),
        )
        .then(
            Filter::new("pad")
                .positional(width)
                .positional(height)
                .positional("(ow-iw)/2")
                .positional("(oh-ih)/2")
                .positional("black"),
        )
        .then(Filter::new("setsar").positional(1))
        .then(Filter::new("fps").positional(fps))
        .then(Filter::new("format").positional("yuv420p"))
}

fn audio_chain(clip: &Clip) -> FilterChain {
    let mut chain = FilterChain::new();
    if let Some((start, end)) = clip.trim_window() {
        chain.push(
            Filter::new("atrim")
                .arg("start", format_number(start))
                .arg("end", format_number(end)),
        );
        chain.push(Filter::new("asetpts").positional("PTS-STARTPTS"));
    }

    if clip.muted {
        // duration unknown, so there is nothing to size a silent source with
        chain.push(Filter::new("volume").positional(0));
    } else if (clip.volume - 1.0).abs() > f64::EPSILON {
        chain.push(Filter::new("volume").positional(format_number(clip.volume)));
    }

    chain.then(audio_format())
}

fn audio_format() -> Filter {
    Filter::new("aformat")
        .arg("sample_fmts", "fltp")
        .arg("sample_rates", SAMPLE_RATE)
        .arg("channel_layouts", CHANNEL_LAYOUT)
}
