mod audio;
mod clips;
mod concat;
mod inputs;
mod subtitles;
mod text;
pub(crate) mod util;

#[cfg(test)]
mod tests;

use crate::error::EditError;
use crate::presets::{VideoFormat, defaults};
use crate::render::ffmpeg::graph::{Filter, FilterGraph};
use crate::render::pipeline::{OutputSettings, PipelineConfig};
use crate::text::FontResolver;

pub use self::audio::track_chain;
pub use self::clips::process_clip;
pub use self::concat::{ConcatOutputs, build_concat_chain, transition_offsets};
pub use self::inputs::InputPlan;
pub use self::subtitles::burn_subtitles;
pub use self::text::{apply_text_layers, position_expressions, text_filter};
pub use self::util::command_string;

/// Labels the final `-map` arguments point at.
pub const VIDEO_OUT: &str = "outv";
pub const AUDIO_OUT: &str = "outa";

#[derive(Debug, Clone)]
pub struct FfmpegCompileOutput {
    /// Everything after the binary name.
    pub args: Vec<String>,
    pub filter_complex: String,
    /// Expected output length, used for progress.
    pub total_duration: f64,
}

impl FfmpegCompileOutput {
    pub fn command(&self, binary: &str) -> Vec<String> {
        let mut command = Vec::with_capacity(self.args.len() + 1);
        command.push(binary.to_string());
        command.extend(self.args.iter().cloned());
        command
    }

    pub fn command_string(&self, binary: &str) -> String {
        command_string(&self.command(binary))
    }
}

/// Codec flags for one container.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeProfile {
    pub video_codec: &'static str,
    pub audio_codec: &'static str,
    pub crf: u8,
    pub video_bitrate: Option<String>,
    pub audio_bitrate: String,
    pub faststart: bool,
    /// VP9 needs `-b:v 0` for constant quality.
    pub constant_quality_bitrate: bool,
}

impl EncodeProfile {
    pub fn for_output(output: &OutputSettings) -> Self {
        let audio_bitrate = output
            .audio_bitrate
            .clone()
            .unwrap_or_else(|| defaults::AUDIO_BITRATE.to_string());
        match output.format {
            VideoFormat::Webm => Self {
                video_codec: "libvpx-vp9",
                audio_codec: "libopus",
                crf: output.quality.crf(),
                video_bitrate: output.video_bitrate.clone(),
                audio_bitrate,
                faststart: false,
                constant_quality_bitrate: true,
            },
            VideoFormat::Mp4 | VideoFormat::Mov => Self {
                video_codec: "libx264",
                audio_codec: "aac",
                crf: output.quality.crf(),
                video_bitrate: output.video_bitrate.clone(),
                audio_bitrate,
                faststart: true,
                constant_quality_bitrate: false,
            },
        }
    }

    pub fn push_to(&self, args: &mut Vec<String>) {
        let mut push = |values: &[&str]| args.extend(values.iter().map(|v| v.to_string()));

        push(&["-c:v", self.video_codec]);
        if self.video_codec == "libx264" {
            push(&["-preset", "medium"]);
        }
        let crf = self.crf.to_string();
        push(&["-crf", crf.as_str()]);
        match (&self.video_bitrate, self.constant_quality_bitrate) {
            (Some(bitrate), _) => push(&["-b:v", bitrate.as_str()]),
            (None, true) => push(&["-b:v", "0"]),
            (None, false) => {}
        }
        push(&["-c:a", self.audio_codec, "-b:a", self.audio_bitrate.as_str()]);
        if self.faststart {
            push(&["-movflags", "+faststart"]);
        }
        push(&["-y"]);
    }
}

pub struct FfmpegCompiler<'a> {
    config: &'a PipelineConfig,
    fonts: &'a FontResolver,
}

impl<'a> FfmpegCompiler<'a> {
    pub fn new(config: &'a PipelineConfig, fonts: &'a FontResolver) -> Self {
        Self { config, fonts }
    }

    /// Produce the argument vector. Pure: nothing is spawned or written.
    pub fn compile(&self) -> Result<FfmpegCompileOutput, EditError> {
        if self.config.clips.is_empty() {
            return Err(EditError::NoClips);
        }

        let total_duration = self.config.total_duration();
        let inputs = InputPlan::build(self.config);
        let graph = self.build_filter_graph(&inputs, total_duration)?;
        let filter_complex = graph.render();

        let mut args = inputs.input_args();
        args.push("-filter_complex".to_string());
        args.push(filter_complex.clone());
        for label in [VIDEO_OUT, AUDIO_OUT] {
            args.push("-map".to_string());
            args.push(format!("[{label}]"));
        }
        EncodeProfile::for_output(&self.config.output).push_to(&mut args);
        args.push(self.config.output.path.to_string_lossy().into_owned());

        Ok(FfmpegCompileOutput {
            args,
            filter_complex,
            total_duration,
        })
    }

    /// Stages run in dependency order: clips, joins, audio tracks and mix,
    /// subtitles, text layers, then the terminal pass-through nodes.
    pub fn build_filter_graph(
        &self,
        inputs: &InputPlan,
        total_duration: f64,
    ) -> Result<FilterGraph, EditError> {
        let config = self.config;
        let target = config.output.dimensions();
        let mut graph = FilterGraph::new();

        let mut video = Vec::with_capacity(config.clips.len());
        let mut audio = Vec::with_capacity(config.clips.len());
        for (i, clip) in config.clips.iter().enumerate() {
            let (v, a) =
                process_clip(&mut graph, i, inputs.clip_input(i), clip, target, config.output.fps)?;
            video.push(v);
            audio.push(a);
        }

        let durations: Vec<f64> = config.clips.iter().map(|c| c.effective_duration()).collect();
        let (joined_video, joined_audio) = build_concat_chain(
            &mut graph,
            &video,
            &audio,
            &durations,
            &config.transitions,
            ConcatOutputs {
                video: "concatv",
                audio: "concata",
            },
        )?;

        let mixed = self.build_audio_mix(&mut graph, inputs, &joined_audio, total_duration)?;

        let mut final_video = joined_video;
        if let Some(subtitles) = &config.subtitles
            && let Some(label) = burn_subtitles(&mut graph, &final_video, subtitles, self.fonts)?
        {
            final_video = label;
        }
        final_video = apply_text_layers(&mut graph, final_video, &config.text_layers, self.fonts)?;

        graph.add(vec![(&final_video).into()], Filter::new("copy"), VIDEO_OUT)?;
        graph.add(vec![(&mixed).into()], Filter::new("anull"), AUDIO_OUT)?;
        Ok(graph)
    }
}
