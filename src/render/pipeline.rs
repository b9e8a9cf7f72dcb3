//! Pipeline configuration, its builder, and execution.
//!
//! A [`PipelineBuilder`] accumulates clips, transitions, audio, subtitles,
//! text and output settings. [`PipelineBuilder::build`] resolves every
//! default in one pass and hands back a [`PipelineConfig`] with nothing left
//! optional; compiling it is pure, executing it spawns the processor once.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::audio::AudioTrack;
use crate::clip::{Clip, validate_clips};
use crate::error::EditError;
use crate::presets::{
    AspectRatio, Platform, Quality, Resolution, SubtitlePreset, VideoDimensions, VideoFormat,
    defaults, dimensions,
};
use crate::render::ffmpeg::compiler::util::overlap;
use crate::render::ffmpeg::compiler::{FfmpegCompileOutput, FfmpegCompiler};
use crate::render::ffmpeg::progress::ProgressInfo;
use crate::render::ffmpeg::services::{FfmpegRunner, RunOptions};
use crate::render::output::{output_file_size, prepare_output_destination};
use crate::subtitles::{
    SubtitleConfig, SubtitleStyleOverrides, create_subtitle_config_from_srt,
};
use crate::text::{FontResolver, TextLayer};
use crate::transitions::{Transition, TransitionType, auto_adjust_transitions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub path: PathBuf,
    #[serde(default)]
    pub format: VideoFormat,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_quality")]
    pub quality: Quality,
    /// Overrides the quality-derived rate when set, e.g. `"8M"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_bitrate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_bitrate: Option<String>,
    /// Platform whose preset was applied, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

fn default_fps() -> u32 {
    defaults::FPS
}

fn default_quality() -> Quality {
    defaults::QUALITY
}

impl OutputSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            format: VideoFormat::from_path(&path).unwrap_or(defaults::FORMAT),
            path,
            aspect_ratio: defaults::ASPECT_RATIO,
            resolution: defaults::RESOLUTION,
            fps: defaults::FPS,
            quality: defaults::QUALITY,
            video_bitrate: None,
            audio_bitrate: None,
            platform: None,
        }
    }

    pub fn dimensions(&self) -> VideoDimensions {
        dimensions(self.aspect_ratio, self.resolution)
    }

    /// Apply a platform's geometry and bitrates.
    pub fn apply_platform(&mut self, platform: Platform) {
        let preset = platform.preset();
        self.format = VideoFormat::Mp4;
        self.aspect_ratio = preset.aspect_ratio;
        self.resolution = preset.resolution;
        self.fps = preset.fps;
        self.video_bitrate = Some(preset.video_bitrate.to_string());
        self.audio_bitrate = Some(preset.audio_bitrate.to_string());
        self.quality = Quality::High;
        self.platform = Some(platform);
    }

    /// Longest upload the target platform accepts, in seconds.
    pub fn max_duration(&self) -> Option<u32> {
        self.platform.and_then(|p| p.preset().max_duration)
    }
}

/// A fully resolved edit: one transition per clip pair, every setting filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    #[serde(default)]
    pub audio_tracks: Vec<AudioTrack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<SubtitleConfig>,
    #[serde(default)]
    pub text_layers: Vec<TextLayer>,
    /// Compress music under the voiceover.
    #[serde(default)]
    pub duck_music: bool,
    pub output: OutputSettings,
}

impl PipelineConfig {
    /// Sum of clip lengths minus what the transitions overlap.
    pub fn total_duration(&self) -> f64 {
        let clips: f64 = self.clips.iter().map(Clip::effective_duration).sum();
        let overlapped: f64 = self
            .transitions
            .iter()
            .take(self.clips.len().saturating_sub(1))
            .map(overlap)
            .sum();
        clips - overlapped
    }

    pub fn compile(&self, fonts: &FontResolver) -> Result<FfmpegCompileOutput, EditError> {
        FfmpegCompiler::new(self, fonts).compile()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    clips: Vec<Clip>,
    transitions: Vec<Option<Transition>>,
    all_transitions: Option<Transition>,
    default_transition: Transition,
    audio_tracks: Vec<AudioTrack>,
    subtitles: Option<SubtitleConfig>,
    text_layers: Vec<TextLayer>,
    duck_music: bool,
    output_path: Option<PathBuf>,
    output: OutputSettings,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            clips: Vec::new(),
            transitions: Vec::new(),
            all_transitions: None,
            default_transition: defaults::TRANSITION.transition(),
            audio_tracks: Vec::new(),
            subtitles: None,
            text_layers: Vec::new(),
            duck_music: false,
            output_path: None,
            output: OutputSettings::new(PathBuf::new()),
        }
    }

    /// Transition used for clip pairs nobody configured.
    pub fn default_transition(mut self, transition: Transition) -> Self {
        self.default_transition = transition;
        self
    }

    pub fn add_clip(mut self, clip: Clip) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn add_clips(mut self, clips: impl IntoIterator<Item = Clip>) -> Self {
        self.clips.extend(clips);
        self
    }

    /// Untrimmed clips with ids `clip-1`, `clip-2`, ...
    pub fn add_clips_from_paths<P: AsRef<Path>>(mut self, paths: &[P]) -> Self {
        let offset = self.clips.len();
        self.clips.extend(paths.iter().enumerate().map(|(i, path)| {
            Clip::new(path.as_ref()).with_id(format!("clip-{}", offset + i + 1))
        }));
        self
    }

    /// Transition between clip `index` and `index + 1`.
    pub fn set_transition(mut self, index: usize, transition: Transition) -> Self {
        if self.transitions.len() <= index {
            self.transitions.resize(index + 1, None);
        }
        self.transitions[index] = Some(transition);
        self
    }

    pub fn set_transitions(mut self, transitions: impl IntoIterator<Item = Transition>) -> Self {
        self.transitions = transitions.into_iter().map(Some).collect();
        self
    }

    /// Same transition between every pair, however many clips end up added.
    pub fn set_all_transitions(mut self, transition: Transition) -> Self {
        self.all_transitions = Some(transition);
        self.transitions.clear();
        self
    }

    pub fn add_audio_track(mut self, track: AudioTrack) -> Self {
        self.audio_tracks.push(track);
        self
    }

    pub fn add_background_music(self, source: impl Into<PathBuf>, volume: Option<f64>) -> Self {
        let track = AudioTrack::background_music(source);
        let track = match volume {
            Some(volume) => track.with_volume(volume),
            None => track,
        };
        self.add_audio_track(track)
    }

    pub fn add_voiceover(self, source: impl Into<PathBuf>, start_at: f64) -> Self {
        self.add_audio_track(AudioTrack::voiceover(source).starting_at(start_at))
    }

    pub fn set_subtitles_from_srt(
        mut self,
        content: &str,
        preset: Option<SubtitlePreset>,
        overrides: Option<&SubtitleStyleOverrides>,
    ) -> Self {
        self.subtitles = Some(create_subtitle_config_from_srt(content, preset, overrides, false));
        self
    }

    pub fn set_subtitles(mut self, subtitles: SubtitleConfig) -> Self {
        self.subtitles = Some(subtitles);
        self
    }

    pub fn add_text_layer(mut self, layer: TextLayer) -> Self {
        self.text_layers.push(layer);
        self
    }

    /// Output path; the container follows the extension unless `format` is given.
    pub fn set_output(mut self, path: impl Into<PathBuf>, format: Option<VideoFormat>) -> Self {
        let path = path.into();
        self.output.format = format
            .or_else(|| VideoFormat::from_path(&path))
            .unwrap_or(defaults::FORMAT);
        self.output_path = Some(path);
        self
    }

    pub fn set_output_for_platform(mut self, path: impl Into<PathBuf>, platform: Platform) -> Self {
        self.output_path = Some(path.into());
        self.output.apply_platform(platform);
        self
    }

    pub fn set_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.output.aspect_ratio = aspect_ratio;
        self
    }

    pub fn set_resolution(mut self, resolution: Resolution) -> Self {
        self.output.resolution = resolution;
        self
    }

    pub fn set_quality(mut self, quality: Quality) -> Self {
        self.output.quality = quality;
        self
    }

    pub fn set_fps(mut self, fps: u32) -> Self {
        self.output.fps = fps;
        self
    }

    pub fn set_bitrates(mut self, video: Option<String>, audio: Option<String>) -> Self {
        self.output.video_bitrate = video;
        self.output.audio_bitrate = audio;
        self
    }

    pub fn set_video_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.output.video_bitrate = Some(bitrate.into());
        self
    }

    pub fn set_audio_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.output.audio_bitrate = Some(bitrate.into());
        self
    }

    pub fn duck_music(mut self, enabled: bool) -> Self {
        self.duck_music = enabled;
        self
    }

    /// Resolve defaults and check the edit can be compiled.
    ///
    /// Missing transitions are filled with the default one, every transition
    /// is clamped into its catalog bounds, then shortened to fit its
    /// neighbouring clips.
    pub fn build(self) -> Result<PipelineConfig, EditError> {
        if self.clips.is_empty() {
            return Err(EditError::NoClips);
        }
        let path = self
            .output_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(EditError::MissingOutputPath)?;

        let pairs = self.clips.len() - 1;
        let fallback = self.all_transitions.unwrap_or(self.default_transition);
        let requested: Vec<Transition> = (0..pairs)
            .map(|i| self.transitions.get(i).copied().flatten().unwrap_or(fallback))
            .map(Transition::normalized)
            .collect();
        let durations: Vec<f64> = self.clips.iter().map(Clip::effective_duration).collect();
        let transitions = auto_adjust_transitions(&durations, &requested);

        Ok(PipelineConfig {
            clips: self.clips,
            transitions,
            audio_tracks: self.audio_tracks,
            subtitles: self.subtitles,
            text_layers: self.text_layers,
            duck_music: self.duck_music,
            output: OutputSettings { path, ..self.output },
        })
    }
}

/// Outcome of one render. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// Wall-clock milliseconds.
    pub processing_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EditResult {
    fn failure(started: Instant, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output_path: None,
            duration: None,
            file_size: None,
            processing_time: elapsed_ms(started),
            error: Some(error.into()),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Validate, compile, and run the processor once.
///
/// `options.total_duration` is filled in from the config. Every failure,
/// from invalid clips to a crashed processor, comes back as an unsuccessful
/// [`EditResult`].
pub async fn execute_pipeline(
    config: &PipelineConfig,
    runner: &dyn FfmpegRunner,
    fonts: &FontResolver,
    mut options: RunOptions,
    on_progress: &mut (dyn FnMut(ProgressInfo) + Send),
) -> EditResult {
    let started = Instant::now();

    let validation = validate_clips(&config.clips);
    if !validation.valid {
        return EditResult::failure(
            started,
            EditError::InvalidClips(validation.messages()).to_string(),
        );
    }

    let compiled = match config.compile(fonts) {
        Ok(compiled) => compiled,
        Err(err) => return EditResult::failure(started, err.to_string()),
    };

    if let Err(err) = prepare_output_destination(config) {
        return EditResult::failure(started, format!("{err:#}"));
    }

    on_progress(ProgressInfo::preparing());
    options.total_duration = compiled.total_duration;
    if let Err(err) = runner.run(&compiled.args, options, on_progress).await {
        return EditResult::failure(started, err.to_string());
    }

    match output_file_size(&config.output.path).await {
        Ok(size) => EditResult {
            success: true,
            output_path: Some(config.output.path.clone()),
            duration: Some(compiled.total_duration),
            file_size: Some(size),
            processing_time: elapsed_ms(started),
            error: None,
        },
        Err(err) => EditResult::failure(started, format!("{err:#}")),
    }
}

/// Transition look for [`create_short_form_video`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionStyle {
    None,
    Flash,
    #[default]
    Fade,
}

impl TransitionStyle {
    pub fn transition(self) -> Transition {
        match self {
            TransitionStyle::None => Transition::none(),
            TransitionStyle::Flash => Transition::new(TransitionType::Flash, Some(0.15), None),
            TransitionStyle::Fade => Transition::new(TransitionType::Fade, Some(0.3), None),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShortFormOptions {
    pub music: Option<PathBuf>,
    pub music_volume: Option<f64>,
    /// SRT or WebVTT text to burn in.
    pub subtitles: Option<String>,
    pub transition_style: TransitionStyle,
    pub platform: Option<Platform>,
}

/// Vertical short with optional music bed and captions.
pub fn create_short_form_video<P: AsRef<Path>>(
    clips: &[P],
    output: impl Into<PathBuf>,
    options: ShortFormOptions,
) -> Result<PipelineConfig, EditError> {
    let mut builder = PipelineBuilder::new()
        .add_clips_from_paths(clips)
        .set_all_transitions(options.transition_style.transition())
        .set_output_for_platform(output, options.platform.unwrap_or(Platform::Tiktok));

    if let Some(music) = options.music {
        builder = builder.add_background_music(
            music,
            Some(options.music_volume.unwrap_or(defaults::MUSIC_VOLUME)),
        );
    }
    if let Some(subtitles) = options.subtitles {
        builder = builder.set_subtitles_from_srt(&subtitles, Some(SubtitlePreset::Tiktok), None);
    }
    builder.build()
}

/// Hard-cut concatenation of whole files.
pub fn concatenate_videos<P: AsRef<Path>>(
    sources: &[P],
    output: impl Into<PathBuf>,
) -> Result<PipelineConfig, EditError> {
    PipelineBuilder::new()
        .add_clips_from_paths(sources)
        .set_all_transitions(Transition::none())
        .set_output(output, None)
        .build()
}
