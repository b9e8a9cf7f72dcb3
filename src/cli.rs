use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::concat::ConcatStyle;
use crate::ui::OutputFormat;

/// Compile declarative short-form video edits into ffmpeg pipelines
#[derive(Parser, Debug)]
#[command(name = "reelkit", author, version, about, long_about = None)]
pub struct Cli {
    /// Print debug events
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output format for messages and reports
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render an edit document to a video file
    Render(RenderArgs),
    /// Validate an edit document and show statistics
    Check(CheckArgs),
    /// Join whole clips, optionally with short-form transitions
    Concat(ConcatArgs),
    /// Convert, regroup and shift subtitle files
    Subtitles {
        #[command(subcommand)]
        command: SubtitleCommands,
    },
    /// List the transition catalog
    Transitions(TransitionsArgs),
    /// List platform, quality and style presets
    Presets,
    /// Check that ffmpeg and fonts are usable
    Doctor,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Edit document (.toml, .json or .yaml)
    #[arg(value_hint = ValueHint::FilePath)]
    pub document: PathBuf,

    /// Output path; overrides the document's output.path
    #[arg(short = 'o', long = "out", value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,

    /// Print the ffmpeg command without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Kill ffmpeg after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Echo ffmpeg's own output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Edit document (.toml, .json or .yaml)
    #[arg(value_hint = ValueHint::FilePath)]
    pub document: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ConcatArgs {
    /// Clips in playback order
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    pub sources: Vec<PathBuf>,

    /// Output video
    #[arg(short = 'o', long = "out", value_hint = ValueHint::FilePath)]
    pub out: PathBuf,

    /// Transition look between clips
    #[arg(long, value_enum, default_value_t = ConcatStyle::Quick)]
    pub style: ConcatStyle,

    /// Clip lengths in seconds, comma separated; needed for transitions
    #[arg(long, value_delimiter = ',')]
    pub durations: Vec<f64>,

    /// Print the ffmpeg command without running it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubtitleCommands {
    /// Convert between SRT, WebVTT and ASS (by extension)
    Convert(SubtitleIoArgs),
    /// Split cues into words and regroup them into short lines
    Regroup {
        #[command(flatten)]
        io: SubtitleIoArgs,
        /// Maximum characters per line
        #[arg(long, default_value_t = crate::subtitles::DEFAULT_MAX_CHARS_PER_LINE)]
        max_chars: usize,
    },
    /// Move every cue by a number of seconds
    Shift {
        #[command(flatten)]
        io: SubtitleIoArgs,
        /// Seconds to add; negative values move cues earlier
        #[arg(long, allow_negative_numbers = true)]
        by: f64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SubtitleIoArgs {
    /// Input subtitle file
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output subtitle file
    #[arg(value_name = "OUTPUT", value_hint = ValueHint::FilePath)]
    pub destination: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct TransitionsArgs {
    /// Only show one category (basic, directional, zoom, wipe, creative, shortform)
    #[arg(long)]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_flags_parse() {
        let cli = Cli::try_parse_from([
            "reelkit", "--output", "json", "render", "edit.toml", "--out", "final.mp4",
            "--dry-run", "--timeout", "30",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.out, Some(PathBuf::from("final.mp4")));
        assert!(args.dry_run);
        assert_eq!(args.timeout, Some(30));
    }

    #[test]
    fn concat_takes_a_duration_list() {
        let cli = Cli::try_parse_from([
            "reelkit", "concat", "a.mp4", "b.mp4", "-o", "out.mp4", "--style", "flashy",
            "--durations", "3,4.5",
        ])
        .unwrap();
        let Commands::Concat(args) = cli.command else {
            panic!("expected concat");
        };
        assert_eq!(args.sources.len(), 2);
        assert_eq!(args.style, ConcatStyle::Flashy);
        assert_eq!(args.durations, vec![3.0, 4.5]);
    }

    #[test]
    fn shift_accepts_negative_offsets() {
        let cli = Cli::try_parse_from(["reelkit", "subtitles", "shift", "in.srt", "out.srt", "--by", "-1.5"])
            .unwrap();
        let Commands::Subtitles {
            command: SubtitleCommands::Shift { by, .. },
        } = cli.command
        else {
            panic!("expected shift");
        };
        assert_eq!(by, -1.5);
    }
}
