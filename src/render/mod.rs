pub mod document;
pub mod ffmpeg;
mod logging;
mod output;
pub mod pipeline;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::json;

use crate::audio::detect_audio_conflicts;
use crate::clip::validate_clips;
use crate::cli::{CheckArgs, RenderArgs};
use crate::config::EditorConfig;
use crate::error::EditError;
use crate::text::FontResolver;
use crate::transitions::Transition;
use crate::ui::prelude::{Level, OutputFormat, get_output_format, print_value};

pub(crate) use self::document::load_edit_document;
pub use self::document::{EditDocument, parse_edit_document};
use self::ffmpeg::progress::ProgressInfo;
use self::ffmpeg::resolve_ffmpeg_binary;
use self::ffmpeg::services::{CancellationToken, FfmpegRunner, RunOptions, SystemFfmpegRunner};
use self::logging::{log_event, log_event_with_data};
pub use self::pipeline::{
    EditResult, OutputSettings, PipelineBuilder, PipelineConfig, ShortFormOptions,
    TransitionStyle, concatenate_videos, create_short_form_video, execute_pipeline,
};

const DEFAULT_BINARY: &str = "ffmpeg";

pub async fn handle_render(args: RenderArgs, config: &EditorConfig) -> Result<Option<EditResult>> {
    let binary = match resolve_ffmpeg_binary(config.ffmpeg_path().as_deref()) {
        Ok(binary) => binary,
        Err(err) if args.dry_run => {
            log_event(Level::Debug, "render.ffmpeg.missing", format!("{err:#}"));
            PathBuf::from(DEFAULT_BINARY)
        }
        Err(err) => return Err(err),
    };
    let runner = SystemFfmpegRunner::new(binary);
    handle_render_with_runner(args, config, &runner).await
}

fn load_pipeline(
    document_path: &Path,
    config: &EditorConfig,
    output_override: Option<PathBuf>,
) -> Result<PipelineConfig> {
    let document = load_edit_document(document_path)?;
    let base_dir = document_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let pipeline = document
        .into_builder(base_dir, config, output_override)?
        .build()
        .with_context(|| format!("Invalid edit document {}", document_path.display()))?;
    Ok(pipeline)
}

pub async fn handle_render_with_runner(
    args: RenderArgs,
    config: &EditorConfig,
    runner: &SystemFfmpegRunner,
) -> Result<Option<EditResult>> {
    log_event(
        Level::Info,
        "render.start",
        format!("Preparing render of {}", args.document.display()),
    );

    let pipeline = load_pipeline(&args.document, config, args.out.clone())?;
    let fonts = config.font_resolver();

    if args.dry_run {
        let compiled = pipeline.compile(&fonts)?;
        let mut command = vec![runner.binary().to_string_lossy().into_owned()];
        command.extend(compiled.args);
        println!("{}", shell_words::join(&command));
        log_event(
            Level::Info,
            "render.dry_run",
            "Dry run completed - ffmpeg command printed above",
        );
        return Ok(None);
    }

    let timeout = args
        .timeout
        .or(config.render_timeout_secs)
        .map(Duration::from_secs);
    let result = run_with_progress(&pipeline, runner, &fonts, timeout, args.verbose).await;
    report_result(&result)?;
    Ok(Some(result))
}

async fn run_with_progress(
    pipeline: &PipelineConfig,
    runner: &dyn FfmpegRunner,
    fonts: &FontResolver,
    timeout: Option<Duration>,
    verbose: bool,
) -> EditResult {
    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.cancel();
        }
    });

    let bar = (get_output_format() == OutputFormat::Text && !verbose).then(progress_bar);
    let mut on_progress = |info: ProgressInfo| {
        if let Some(bar) = &bar {
            bar.set_position(u64::from(info.percent));
            bar.set_message(format!("{:?}", info.stage).to_lowercase());
        } else {
            log_event_with_data(
                Level::Debug,
                "render.progress",
                format!("{}%", info.percent),
                json!(info),
            );
        }
    };

    let options = RunOptions {
        timeout,
        cancel: Some(cancel),
        verbose,
        ..RunOptions::default()
    };
    let result = execute_pipeline(pipeline, runner, fonts, options, &mut on_progress).await;

    ctrl_c.abort();
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    result
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% ({eta}) {msg}")
    {
        bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏ "));
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_message("preparing");
    bar
}

fn report_result(result: &EditResult) -> Result<()> {
    let data = serde_json::to_value(result).unwrap_or_default();
    if result.success {
        let path = result
            .output_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        log_event_with_data(
            Level::Success,
            "render.done",
            format!(
                "Rendered {path} ({:.1}s of video in {:.1}s)",
                result.duration.unwrap_or_default(),
                result.processing_time as f64 / 1000.0
            ),
            data,
        );
        return Ok(());
    }

    let error = result.error.clone().unwrap_or_else(|| "unknown error".into());
    log_event_with_data(Level::Error, "render.failed", format!("Render failed: {error}"), data);
    bail!("Render failed: {error}")
}

/// What `check` reports about a document.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub clip_count: usize,
    pub audio_track_count: usize,
    pub subtitle_count: usize,
    pub text_layer_count: usize,
    pub estimated_duration: f64,
    pub transitions: Vec<Transition>,
    pub warnings: Vec<String>,
}

impl CheckReport {
    fn text(&self) -> String {
        let mut lines = vec![
            format!("Clips: {}", self.clip_count),
            format!("Estimated duration: {:.2}s", self.estimated_duration),
            format!(
                "Audio tracks: {}, Subtitles: {}, Text layers: {}",
                self.audio_track_count, self.subtitle_count, self.text_layer_count
            ),
        ];
        for (i, t) in self.transitions.iter().enumerate() {
            lines.push(format!("  {} -> {}: {} ({:.2}s)", i + 1, i + 2, t.kind, t.duration));
        }
        for warning in &self.warnings {
            lines.push(format!("Warning: {warning}"));
        }
        lines.join("\n")
    }
}

pub fn check_pipeline(pipeline: &PipelineConfig) -> Result<CheckReport, EditError> {
    let validation = validate_clips(&pipeline.clips);
    if !validation.valid {
        return Err(EditError::InvalidClips(validation.messages()));
    }
    // compiling catches label errors the validators cannot see
    pipeline.compile(&FontResolver::offline())?;

    let mut warnings = Vec::new();
    let conflicts = detect_audio_conflicts(&pipeline.audio_tracks);
    if let Some(message) = conflicts.message {
        warnings.push(message);
    }
    if let Some(max) = pipeline.output.max_duration()
        && pipeline.total_duration() > f64::from(max)
    {
        warnings.push(format!(
            "Output is {:.1}s, longer than the {max}s the target platform accepts",
            pipeline.total_duration()
        ));
    }

    Ok(CheckReport {
        clip_count: pipeline.clips.len(),
        audio_track_count: pipeline.audio_tracks.len(),
        subtitle_count: pipeline
            .subtitles
            .as_ref()
            .map(|s| s.entries.len())
            .unwrap_or_default(),
        text_layer_count: pipeline.text_layers.len(),
        estimated_duration: pipeline.total_duration(),
        transitions: pipeline.transitions.clone(),
        warnings,
    })
}

pub fn handle_check(args: CheckArgs, config: &EditorConfig) -> Result<CheckReport> {
    let pipeline = load_pipeline(&args.document, config, None)?;
    let report = check_pipeline(&pipeline)
        .with_context(|| format!("{} failed validation", args.document.display()))?;

    log_event(
        Level::Success,
        "check.valid",
        format!("{} is a valid edit", args.document.display()),
    );
    print_value(&report, || report.text());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Clip;
    use crate::presets::Platform;

    #[test]
    fn check_reports_adjusted_transitions() {
        let pipeline = PipelineBuilder::new()
            .add_clips([
                Clip::new("a.mp4").with_duration(1.0),
                Clip::new("b.mp4").with_duration(4.0),
            ])
            .set_all_transitions(Transition::new(
                crate::transitions::TransitionType::Fade,
                Some(2.0),
                None,
            ))
            .set_output("out.mp4", None)
            .build()
            .unwrap();
        let report = check_pipeline(&pipeline).unwrap();
        assert_eq!(report.clip_count, 2);
        assert!((report.transitions[0].duration - 0.4).abs() < 1e-9);
        assert!((report.estimated_duration - 4.6).abs() < 1e-9);
        assert!(report.warnings.is_empty());
        assert!(report.text().contains("1 -> 2: fade (0.40s)"));
    }

    #[test]
    fn check_rejects_invalid_clips() {
        let pipeline = PipelineBuilder::new()
            .add_clip(Clip::trimmed("a.mp4", 3.0, 1.0).with_id("broken"))
            .set_output("out.mp4", None)
            .build()
            .unwrap();
        match check_pipeline(&pipeline) {
            Err(EditError::InvalidClips(messages)) => {
                assert!(messages[0].starts_with("broken:"));
            }
            other => panic!("expected invalid clips, got {other:?}"),
        }
    }

    #[test]
    fn check_warns_about_platform_limits() {
        let pipeline = PipelineBuilder::new()
            .add_clip(Clip::new("a.mp4").with_duration(75.0))
            .set_output_for_platform("out.mp4", Platform::Shorts)
            .build()
            .unwrap();
        let report = check_pipeline(&pipeline).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("60s"));
    }
}
