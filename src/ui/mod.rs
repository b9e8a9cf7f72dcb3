use colored::*;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
    Debug,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Debug => "debug",
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Level::Error | Level::Warn)
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

lazy_static! {
    static ref RENDERER: RwLock<Renderer> = RwLock::new(Renderer::default());
    static ref ANSI_ESCAPE: Regex =
        Regex::new(r"\x1b\[[0-9;?]*[@-~]").expect("valid ansi pattern");
}

static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_debug_mode(enabled: bool) {
    DEBUG_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

pub fn init(format: OutputFormat, color: bool) {
    if let Ok(mut r) = RENDERER.write() {
        r.format = format;
        r.color = color;
    }
}

fn renderer() -> Renderer {
    RENDERER
        .read()
        .map(|r| r.clone())
        .unwrap_or_default()
}

#[derive(Serialize)]
struct Event<'a> {
    level: &'a str,
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

fn colorize(level: Level, s: &str, enable: bool) -> String {
    if !enable {
        return s.to_string();
    }
    match level {
        Level::Info => s.normal().to_string(),
        Level::Success => s.green().bold().to_string(),
        Level::Warn => s.yellow().bold().to_string(),
        Level::Error => s.red().bold().to_string(),
        Level::Debug => s.dimmed().to_string(),
    }
}

fn strip_ansi(input: &str) -> String {
    ANSI_ESCAPE.replace_all(input, "").into_owned()
}

fn format_event(level: Level, code: &str, message: &str, data: Option<serde_json::Value>) -> String {
    let clean = strip_ansi(message);
    let event = Event {
        level: level.as_str(),
        code,
        message: &clean,
        data,
    };
    serde_json::to_string(&event).unwrap_or_else(|_| clean.clone())
}

/// Print one event. Debug events are dropped unless `--debug` is on.
pub fn emit(level: Level, code: &str, message: &str, data: Option<serde_json::Value>) {
    if level == Level::Debug && !is_debug_enabled() {
        return;
    }

    let r = renderer();
    let line = match r.format {
        OutputFormat::Text => colorize(level, message, r.color),
        OutputFormat::Json => format_event(level, code, message, data),
    };
    let mut out: Box<dyn Write> = if level.to_stderr() {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    let _ = writeln!(out, "{line}");
}

pub fn get_output_format() -> OutputFormat {
    renderer().format
}

/// Print a value as pretty JSON, or its text form in text mode.
pub fn print_value<T: Serialize>(value: &T, text: impl FnOnce() -> String) {
    let output = match get_output_format() {
        OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_default(),
        OutputFormat::Text => text(),
    };
    println!("{output}");
}

pub mod prelude {
    pub use super::{Level, OutputFormat, emit, get_output_format, print_value};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_events_carry_code_and_data() {
        let line = format_event(
            Level::Success,
            "render.done",
            "\x1b[1;32mDone\x1b[0m",
            Some(json!({ "size": 12 })),
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "success");
        assert_eq!(value["code"], "render.done");
        assert_eq!(value["message"], "Done");
        assert_eq!(value["data"]["size"], 12);
    }

    #[test]
    fn events_without_data_omit_the_field() {
        let line = format_event(Level::Info, "render.start", "Rendering", None);
        assert!(!line.contains("data"));
    }

    #[test]
    fn plain_text_when_color_is_off() {
        assert_eq!(colorize(Level::Error, "boom", false), "boom");
    }
}
