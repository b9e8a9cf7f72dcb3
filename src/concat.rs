//! Standalone concatenation: join whole clips with optional transitions,
//! without the audio, subtitle and text stages of a full pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clip::Clip;
use crate::error::EditError;
use crate::presets::{AspectRatio, Quality, Resolution, defaults};
use crate::render::ffmpeg::compiler::{
    AUDIO_OUT, ConcatOutputs, EncodeProfile, InputPlan, VIDEO_OUT, build_concat_chain,
    command_string, process_clip,
};
use crate::render::ffmpeg::graph::FilterGraph;
use crate::render::pipeline::OutputSettings;
use crate::transitions::{Transition, TransitionType, calculate_transition_overlap};

pub const DEFAULT_OUTPUT_PATH: &str = "./output.mp4";

/// Clips plus exactly one transition per neighbouring pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcatConfig {
    pub clips: Vec<Clip>,
    pub transitions: Vec<Transition>,
    pub default_transition: Transition,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Default)]
pub struct ConcatOptions {
    /// Per-pair transitions; missing entries use `default_transition`.
    pub transitions: Vec<Transition>,
    pub default_transition: Option<Transition>,
    pub output: Option<OutputSettings>,
}

/// Fill every transition gap and every output default.
pub fn build_concat_config(clips: Vec<Clip>, options: ConcatOptions) -> ConcatConfig {
    let default_transition = options
        .default_transition
        .unwrap_or_else(|| defaults::TRANSITION.transition());
    let pairs = clips.len().saturating_sub(1);
    let transitions = (0..pairs)
        .map(|i| {
            options
                .transitions
                .get(i)
                .copied()
                .unwrap_or(default_transition)
                .normalized()
        })
        .collect();

    ConcatConfig {
        clips,
        transitions,
        default_transition,
        output: options
            .output
            .unwrap_or_else(|| OutputSettings::new(DEFAULT_OUTPUT_PATH)),
    }
}

/// Clip lengths minus the time eaten by overlapping transitions.
pub fn calculate_output_duration(config: &ConcatConfig) -> f64 {
    let clips: f64 = config.clips.iter().map(Clip::effective_duration).sum();
    clips - calculate_transition_overlap(&config.transitions)
}

fn numbered_clips<P: AsRef<Path>>(sources: &[P]) -> Vec<Clip> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| Clip::new(source.as_ref()).with_id(format!("clip-{i}")))
        .collect()
}

fn output_with_geometry(
    path: impl Into<PathBuf>,
    aspect_ratio: Option<AspectRatio>,
    resolution: Option<Resolution>,
) -> OutputSettings {
    let mut output = OutputSettings::new(path);
    if let Some(aspect_ratio) = aspect_ratio {
        output.aspect_ratio = aspect_ratio;
    }
    if let Some(resolution) = resolution {
        output.resolution = resolution;
    }
    output
}

/// Hard cuts only.
pub fn simple_concat_config<P: AsRef<Path>>(
    sources: &[P],
    output_path: impl Into<PathBuf>,
    aspect_ratio: Option<AspectRatio>,
    resolution: Option<Resolution>,
) -> ConcatConfig {
    let clips = numbered_clips(sources);
    let transitions = vec![Transition::none(); clips.len().saturating_sub(1)];
    build_concat_config(
        clips,
        ConcatOptions {
            transitions,
            default_transition: None,
            output: Some(output_with_geometry(output_path, aspect_ratio, resolution)),
        },
    )
}

/// The same transition between every pair.
pub fn uniform_transition_config<P: AsRef<Path>>(
    sources: &[P],
    output_path: impl Into<PathBuf>,
    transition: Transition,
    aspect_ratio: Option<AspectRatio>,
    resolution: Option<Resolution>,
) -> ConcatConfig {
    build_concat_config(
        numbered_clips(sources),
        ConcatOptions {
            transitions: Vec::new(),
            default_transition: Some(transition),
            output: Some(output_with_geometry(output_path, aspect_ratio, resolution)),
        },
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConcatStyle {
    None,
    #[default]
    Quick,
    Flashy,
}

impl ConcatStyle {
    pub fn transition(self) -> Transition {
        match self {
            ConcatStyle::None => Transition::none(),
            ConcatStyle::Quick => Transition::new(TransitionType::Fade, Some(0.2), None),
            ConcatStyle::Flashy => Transition::new(TransitionType::Flash, Some(0.15), None),
        }
    }
}

/// Vertical 1080p at 30 fps, high quality.
pub fn short_form_concat_config<P: AsRef<Path>>(
    sources: &[P],
    output_path: impl Into<PathBuf>,
    style: ConcatStyle,
) -> ConcatConfig {
    let mut output = OutputSettings::new(output_path);
    output.aspect_ratio = AspectRatio::Vertical;
    output.resolution = Resolution::Hd1080;
    output.fps = 30;
    output.quality = Quality::High;

    build_concat_config(
        numbered_clips(sources),
        ConcatOptions {
            transitions: Vec::new(),
            default_transition: Some(style.transition()),
            output: Some(output),
        },
    )
}

/// Compiled concatenation, split the way the command is assembled.
#[derive(Debug, Clone)]
pub struct ConcatPlan {
    pub filter_complex: String,
    /// `-i` pairs, one per clip.
    pub inputs: Vec<String>,
    pub output_args: Vec<String>,
    pub estimated_duration: f64,
}

pub fn generate_concat_filter_complex(config: &ConcatConfig) -> Result<ConcatPlan, EditError> {
    if config.clips.is_empty() {
        return Err(EditError::NoClips);
    }

    let plan = InputPlan::from_clip_sources(config.clips.iter().map(|c| c.source.clone()).collect());
    let target = config.output.dimensions();
    let mut graph = FilterGraph::new();

    let mut video = Vec::with_capacity(config.clips.len());
    let mut audio = Vec::with_capacity(config.clips.len());
    for (i, clip) in config.clips.iter().enumerate() {
        let (v, a) = process_clip(&mut graph, i, plan.clip_input(i), clip, target, config.output.fps)?;
        video.push(v);
        audio.push(a);
    }

    let durations: Vec<f64> = config.clips.iter().map(Clip::effective_duration).collect();
    build_concat_chain(
        &mut graph,
        &video,
        &audio,
        &durations,
        &config.transitions,
        ConcatOutputs {
            video: VIDEO_OUT,
            audio: AUDIO_OUT,
        },
    )?;

    let mut output_args = Vec::new();
    EncodeProfile::for_output(&config.output).push_to(&mut output_args);

    Ok(ConcatPlan {
        filter_complex: graph.render(),
        inputs: plan.input_args(),
        output_args,
        estimated_duration: calculate_output_duration(config),
    })
}

/// Full command, binary first.
pub fn generate_concat_command(config: &ConcatConfig, binary: &str) -> Result<Vec<String>, EditError> {
    let plan = generate_concat_filter_complex(config)?;

    let mut command = vec![binary.to_string()];
    command.extend(plan.inputs);
    command.push("-filter_complex".to_string());
    command.push(plan.filter_complex);
    for label in [VIDEO_OUT, AUDIO_OUT] {
        command.push("-map".to_string());
        command.push(format!("[{label}]"));
    }
    command.extend(plan.output_args);
    command.push(config.output.path.to_string_lossy().into_owned());
    Ok(command)
}

pub fn generate_concat_command_string(config: &ConcatConfig, binary: &str) -> Result<String, EditError> {
    Ok(command_string(&generate_concat_command(config, binary)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::VideoDimensions;

    fn timed(config: ConcatConfig, duration: f64) -> ConcatConfig {
        ConcatConfig {
            clips: config
                .clips
                .into_iter()
                .map(|c| c.with_duration(duration))
                .collect(),
            ..config
        }
    }

    #[test]
    fn gaps_take_the_default_transition() {
        let flash = Transition::new(TransitionType::Flash, Some(0.15), None);
        let config = build_concat_config(
            vec![Clip::new("a.mp4"), Clip::new("b.mp4"), Clip::new("c.mp4")],
            ConcatOptions {
                transitions: vec![Transition::none()],
                default_transition: Some(flash),
                output: None,
            },
        );
        assert_eq!(config.transitions, vec![Transition::none(), flash]);
        assert_eq!(config.output.path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(config.output.quality, Quality::High);
    }

    #[test]
    fn single_clip_has_no_transitions() {
        let config = build_concat_config(vec![Clip::new("a.mp4")], ConcatOptions::default());
        assert!(config.transitions.is_empty());
    }

    #[test]
    fn output_duration_subtracts_overlaps() {
        let config = timed(
            uniform_transition_config(
                &["a.mp4", "b.mp4", "c.mp4"],
                "out.mp4",
                Transition::new(TransitionType::Fade, Some(0.5), None),
                None,
                None,
            ),
            4.0,
        );
        assert!((calculate_output_duration(&config) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn convenience_configs() {
        let simple = simple_concat_config(&["a.mp4", "b.mp4"], "out.mp4", Some(AspectRatio::Square), None);
        assert_eq!(simple.clips[0].id, "clip-0");
        assert_eq!(simple.clips[1].id, "clip-1");
        assert_eq!(simple.transitions, vec![Transition::none()]);
        assert_eq!(simple.output.dimensions(), VideoDimensions::new(1080, 1080));

        let short = short_form_concat_config(&["a.mp4", "b.mp4"], "out.mp4", ConcatStyle::default());
        assert_eq!(short.transitions[0].kind, TransitionType::Fade);
        assert!((short.transitions[0].duration - 0.2).abs() < 1e-9);
        assert_eq!(short.output.dimensions(), VideoDimensions::new(1080, 1920));

        let flashy = short_form_concat_config(&["a.mp4", "b.mp4"], "out.mp4", ConcatStyle::Flashy);
        assert_eq!(flashy.transitions[0].kind, TransitionType::Flash);
    }

    #[test]
    fn command_maps_terminal_labels() {
        let config = timed(
            short_form_concat_config(&["a.mp4", "b.mp4"], "out.mp4", ConcatStyle::Quick),
            3.0,
        );
        let command = generate_concat_command(&config, "ffmpeg").unwrap();
        assert_eq!(command[..5], ["ffmpeg", "-i", "a.mp4", "-i", "b.mp4"]);
        assert_eq!(command.last().map(String::as_str), Some("out.mp4"));

        let graph = &command[6];
        assert!(graph.contains("xfade=transition=fade:duration=0.2:offset=2.8[outv]"));
        assert!(graph.contains("acrossfade=d=0.2:c1=tri:c2=tri[outa]"));
        assert!(command.windows(2).any(|w| w == ["-map", "[outv]"]));
        assert!(command.windows(2).any(|w| w == ["-b:a", "192k"]));
    }

    #[test]
    fn video_bitrate_is_passed_when_set() {
        let mut config = simple_concat_config(&["a.mp4"], "out.mp4", None, None);
        config.output.video_bitrate = Some("8M".into());
        let command = generate_concat_command(&config, "ffmpeg").unwrap();
        assert!(command.windows(2).any(|w| w == ["-b:v", "8M"]));
        assert!(command[4].contains("[v0]copy[outv]"));
    }

    #[test]
    fn command_string_quotes_graph_arguments() {
        let config = simple_concat_config(&["my clip.mp4", "b.mp4"], "out.mp4", None, None);
        let line = generate_concat_command_string(&config, "ffmpeg").unwrap();
        assert!(line.starts_with("ffmpeg -i \"my clip.mp4\" -i b.mp4 -filter_complex \"[0:v]"));
        assert!(line.contains("-map \"[outv]\""));
    }

    #[test]
    fn empty_concat_is_rejected() {
        let config = build_concat_config(Vec::new(), ConcatOptions::default());
        assert_eq!(generate_concat_command(&config, "ffmpeg"), Err(EditError::NoClips));
    }
}
