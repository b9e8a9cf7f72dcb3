use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde::Serialize;

use crate::cli::{Commands, ConcatArgs, SubtitleCommands, SubtitleIoArgs, TransitionsArgs};
use crate::concat::{
    ConcatConfig, ConcatStyle, calculate_output_duration, generate_concat_command,
    short_form_concat_config, simple_concat_config,
};
use crate::config::EditorConfig;
use crate::doctor::handle_doctor;
use crate::presets::{Platform, Quality, SubtitlePreset, TransitionPreset, defaults};
use crate::render::ffmpeg::progress::ProgressInfo;
use crate::render::ffmpeg::resolve_ffmpeg_binary;
use crate::render::ffmpeg::services::{FfmpegRunner, RunOptions, SystemFfmpegRunner};
use crate::render::{handle_check, handle_render};
use crate::subtitles::{
    SubtitleEntry, SubtitleFormat, group_words_into_lines, offset_subtitles, split_into_words,
};
use crate::transitions::{
    TRANSITIONS, TransitionCategory, TransitionDefinition, auto_adjust_transitions,
};
use crate::ui::prelude::{Level, OutputFormat, emit, get_output_format};

pub async fn handle_command(command: Commands, config: &EditorConfig) -> Result<()> {
    match command {
        Commands::Render(args) => handle_render(args, config).await.map(|_| ()),
        Commands::Check(args) => handle_check(args, config).map(|_| ()),
        Commands::Concat(args) => handle_concat(args, config).await,
        Commands::Subtitles { command } => handle_subtitles(command, config),
        Commands::Transitions(args) => handle_transitions(args),
        Commands::Presets => handle_presets(),
        Commands::Doctor => handle_doctor(config).await,
    }
}

/// Concat settings for the CLI: clip lengths applied, transitions fitted to them.
fn concat_config(args: &ConcatArgs) -> Result<ConcatConfig> {
    if !args.durations.is_empty() && args.durations.len() != args.sources.len() {
        bail!(
            "Got {} durations for {} clips",
            args.durations.len(),
            args.sources.len()
        );
    }
    if args.durations.is_empty() && args.style != ConcatStyle::None && args.sources.len() > 1 {
        bail!("Transitions need clip lengths; pass --durations or use --style none");
    }

    let mut config = match args.style {
        ConcatStyle::None => simple_concat_config(&args.sources, &args.out, None, None),
        style => short_form_concat_config(&args.sources, &args.out, style),
    };
    for (clip, duration) in config.clips.iter_mut().zip(&args.durations) {
        clip.duration = Some(*duration);
    }
    if !args.durations.is_empty() {
        config.transitions = auto_adjust_transitions(&args.durations, &config.transitions);
    }
    Ok(config)
}

pub async fn handle_concat(args: ConcatArgs, config: &EditorConfig) -> Result<()> {
    let concat = concat_config(&args)?;
    let binary = match resolve_ffmpeg_binary(config.ffmpeg_path().as_deref()) {
        Ok(binary) => binary,
        Err(_) if args.dry_run => "ffmpeg".into(),
        Err(err) => return Err(err),
    };
    let command = generate_concat_command(&concat, &binary.to_string_lossy())?;

    if args.dry_run {
        println!("{}", shell_words::join(&command));
        return Ok(());
    }

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    emit(
        Level::Info,
        "concat.start",
        &format!("Joining {} clips into {}", concat.clips.len(), args.out.display()),
        None,
    );
    let runner = SystemFfmpegRunner::new(binary);
    let options = RunOptions::new(calculate_output_duration(&concat));
    runner
        .run(&command[1..], options, &mut |info: ProgressInfo| {
            emit(
                Level::Debug,
                "concat.progress",
                &format!("{}%", info.percent),
                None,
            )
        })
        .await?;
    emit(
        Level::Success,
        "concat.done",
        &format!("Wrote {}", args.out.display()),
        None,
    );
    Ok(())
}

fn read_entries(path: &Path) -> Result<Vec<SubtitleEntry>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read subtitles {}", path.display()))?;
    let format = SubtitleFormat::from_path(path).unwrap_or_else(|_| SubtitleFormat::detect(&contents));
    Ok(format.parse(&contents)?)
}

fn write_entries(path: &Path, entries: &[SubtitleEntry], config: &EditorConfig) -> Result<()> {
    let format = SubtitleFormat::from_path(path)?;
    let style = config.subtitle_preset.style();
    let play_res = crate::presets::dimensions(defaults::ASPECT_RATIO, defaults::RESOLUTION);
    fs::write(path, format.render(entries, &style, play_res))
        .with_context(|| format!("Failed to write subtitles {}", path.display()))
}

pub fn handle_subtitles(command: SubtitleCommands, config: &EditorConfig) -> Result<()> {
    let (io, entries, code) = match command {
        SubtitleCommands::Convert(io) => {
            let entries = read_entries(&io.input)?;
            (io, entries, "subtitles.convert")
        }
        SubtitleCommands::Regroup { io, max_chars } => {
            let words = split_into_words(&read_entries(&io.input)?);
            (io, group_words_into_lines(&words, max_chars.max(1)), "subtitles.regroup")
        }
        SubtitleCommands::Shift { io, by } => {
            let entries = offset_subtitles(&read_entries(&io.input)?, by);
            (io, entries, "subtitles.shift")
        }
    };

    write_subtitle_output(&io, &entries, config, code)
}

fn write_subtitle_output(
    io: &SubtitleIoArgs,
    entries: &[SubtitleEntry],
    config: &EditorConfig,
    code: &str,
) -> Result<()> {
    write_entries(&io.destination, entries, config)?;
    emit(
        Level::Success,
        code,
        &format!(
            "Wrote {} cues to {}",
            entries.len(),
            io.destination.display()
        ),
        Some(serde_json::json!({
            "input": io.input,
            "output": io.destination,
            "cues": entries.len(),
        })),
    );
    Ok(())
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(Cell::new).collect::<Vec<_>>());
    table
}

#[derive(Serialize)]
struct TransitionRow {
    id: &'static str,
    name: &'static str,
    category: TransitionCategory,
    default_duration: f64,
    min_duration: f64,
    max_duration: f64,
    xfade: Option<&'static str>,
    description: &'static str,
}

impl From<&TransitionDefinition> for TransitionRow {
    fn from(def: &TransitionDefinition) -> Self {
        Self {
            id: def.kind.as_str(),
            name: def.name,
            category: def.category,
            default_duration: def.default_duration,
            min_duration: def.min_duration,
            max_duration: def.max_duration,
            xfade: def.xfade,
            description: def.description,
        }
    }
}

pub fn handle_transitions(args: TransitionsArgs) -> Result<()> {
    let category = args
        .category
        .as_deref()
        .map(|value| {
            TransitionCategory::parse(value).ok_or_else(|| {
                anyhow!(
                    "Unknown transition category '{value}'. Expected one of: {}",
                    TransitionCategory::ALL.map(|c| c.as_str()).join(", ")
                )
            })
        })
        .transpose()?;

    let rows: Vec<TransitionRow> = TRANSITIONS
        .iter()
        .filter(|def| category.is_none_or(|c| def.category == c))
        .map(TransitionRow::from)
        .collect();

    if get_output_format() == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = new_table(&["Id", "Category", "Default", "Range", "xfade", "Description"]);
    for row in &rows {
        table.add_row(vec![
            row.id.to_string(),
            row.category.to_string(),
            format!("{}s", row.default_duration),
            format!("{}-{}s", row.min_duration, row.max_duration),
            row.xfade.unwrap_or("-").to_string(),
            row.description.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn handle_presets() -> Result<()> {
    if get_output_format() == OutputFormat::Json {
        let platforms: Vec<_> = Platform::ALL
            .iter()
            .map(|p| {
                let preset = p.preset();
                serde_json::json!({
                    "platform": p.as_str(),
                    "aspect_ratio": preset.aspect_ratio.as_str(),
                    "resolution": preset.resolution.as_str(),
                    "fps": preset.fps,
                    "max_duration": preset.max_duration,
                    "video_bitrate": preset.video_bitrate,
                    "audio_bitrate": preset.audio_bitrate,
                })
            })
            .collect();
        let qualities: Vec<_> = Quality::ALL
            .iter()
            .map(|q| {
                let preset = q.preset();
                serde_json::json!({
                    "quality": q.as_str(),
                    "crf": q.crf(),
                    "video_bitrate": preset.video_bitrate,
                    "audio_bitrate": preset.audio_bitrate,
                    "fps": preset.fps,
                })
            })
            .collect();
        let value = serde_json::json!({
            "platforms": platforms,
            "qualities": qualities,
            "subtitle_styles": SubtitlePreset::ALL.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            "transitions": TransitionPreset::ALL.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut platforms = new_table(&["Platform", "Aspect", "Size", "FPS", "Max length", "Bitrates"]);
    for platform in Platform::ALL {
        let preset = platform.preset();
        let size = crate::presets::dimensions(preset.aspect_ratio, preset.resolution);
        platforms.add_row(vec![
            platform.to_string(),
            preset.aspect_ratio.to_string(),
            format!("{}x{}", size.width, size.height),
            preset.fps.to_string(),
            preset
                .max_duration
                .map(|s| format!("{s}s"))
                .unwrap_or_else(|| "-".to_string()),
            format!("{} / {}", preset.video_bitrate, preset.audio_bitrate),
        ]);
    }
    println!("{platforms}");

    let mut qualities = new_table(&["Quality", "CRF", "Video", "Audio", "FPS"]);
    for quality in Quality::ALL {
        let preset = quality.preset();
        qualities.add_row(vec![
            quality.to_string(),
            quality.crf().to_string(),
            preset.video_bitrate.to_string(),
            preset.audio_bitrate.to_string(),
            preset.fps.to_string(),
        ]);
    }
    println!("{qualities}");

    let mut styles = new_table(&["Subtitle style", "Font", "Size", "Color", "Animation"]);
    for preset in SubtitlePreset::ALL {
        let style = preset.style();
        styles.add_row(vec![
            preset.to_string(),
            style.font_family.clone(),
            style.font_size.to_string(),
            style.font_color.clone(),
            format!("{:?}", style.animation).to_lowercase(),
        ]);
    }
    println!("{styles}");

    let mut transitions = new_table(&["Transition preset", "Type", "Duration"]);
    for preset in TransitionPreset::ALL {
        let transition = preset.transition();
        transitions.add_row(vec![
            preset.to_string(),
            transition.kind.to_string(),
            format!("{}s", transition.duration),
        ]);
    }
    println!("{transitions}");
    Ok(())
}
