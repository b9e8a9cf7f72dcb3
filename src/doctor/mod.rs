use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;

use crate::config::EditorConfig;
use crate::render::ffmpeg::{check_ffmpeg_available, ffmpeg_version, resolve_ffmpeg_binary};
use crate::ui::prelude::{OutputFormat, get_output_format};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum CheckStatus {
    Pass(String),
    Fail(String),
    Warning(String),
}

impl CheckStatus {
    pub fn message(&self) -> &str {
        match self {
            CheckStatus::Pass(msg) | CheckStatus::Fail(msg) | CheckStatus::Warning(msg) => msg,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CheckStatus::Fail(_))
    }

    pub fn color_status(&self) -> impl Display {
        match self {
            CheckStatus::Pass(_) => "PASS".green(),
            CheckStatus::Fail(_) => "FAIL".red(),
            CheckStatus::Warning(_) => "WARN".yellow(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    #[serde(flatten)]
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_message: Option<String>,
}

#[async_trait::async_trait]
pub trait DoctorCheck: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self) -> CheckStatus;

    fn fix_message(&self) -> Option<String> {
        None
    }
}

/// The processor binary can be found and runs.
pub struct FfmpegCheck {
    configured: Option<PathBuf>,
}

#[async_trait::async_trait]
impl DoctorCheck for FfmpegCheck {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn execute(&self) -> CheckStatus {
        let binary = match resolve_ffmpeg_binary(self.configured.as_deref()) {
            Ok(binary) => binary,
            Err(err) => return CheckStatus::Fail(format!("{err:#}")),
        };

        let target = binary.clone();
        let detected = tokio::task::spawn_blocking(move || {
            check_ffmpeg_available(&target).then(|| ffmpeg_version(&target))
        })
        .await;

        match detected {
            Ok(Some(Ok(version))) => {
                CheckStatus::Pass(format!("ffmpeg {version} at {}", binary.display()))
            }
            Ok(Some(Err(_))) => CheckStatus::Warning(format!(
                "{} runs but did not report a version",
                binary.display()
            )),
            Ok(None) => CheckStatus::Fail(format!("{} could not be executed", binary.display())),
            Err(err) => CheckStatus::Fail(format!("version check failed: {err}")),
        }
    }

    fn fix_message(&self) -> Option<String> {
        Some("Install ffmpeg or set ffmpeg_path in the config".to_string())
    }
}

/// `fc-list` is used to check whether font families are installed.
pub struct FontListCheck;

#[async_trait::async_trait]
impl DoctorCheck for FontListCheck {
    fn name(&self) -> &'static str {
        "fontconfig"
    }

    async fn execute(&self) -> CheckStatus {
        match which::which("fc-list") {
            Ok(path) => CheckStatus::Pass(format!("fc-list at {}", path.display())),
            Err(_) => CheckStatus::Warning(
                "fc-list not found; fonts fall back to the catalog defaults".to_string(),
            ),
        }
    }

    fn fix_message(&self) -> Option<String> {
        Some("Install fontconfig".to_string())
    }
}

/// The configured fonts directory exists.
pub struct FontsDirCheck {
    dir: Option<PathBuf>,
}

#[async_trait::async_trait]
impl DoctorCheck for FontsDirCheck {
    fn name(&self) -> &'static str {
        "fonts_dir"
    }

    async fn execute(&self) -> CheckStatus {
        match &self.dir {
            None => CheckStatus::Pass("not configured".to_string()),
            Some(dir) if dir.is_dir() => CheckStatus::Pass(dir.display().to_string()),
            Some(dir) => CheckStatus::Fail(format!("{} is not a directory", dir.display())),
        }
    }

    fn fix_message(&self) -> Option<String> {
        Some("Create the directory or remove fonts_dir from the config".to_string())
    }
}

pub fn default_checks(config: &EditorConfig) -> Vec<Box<dyn DoctorCheck>> {
    vec![
        Box::new(FfmpegCheck {
            configured: config.ffmpeg_path(),
        }),
        Box::new(FontListCheck),
        Box::new(FontsDirCheck {
            dir: config.fonts_dir(),
        }),
    ]
}

pub async fn run_all_checks(checks: Vec<Box<dyn DoctorCheck>>) -> Vec<CheckResult> {
    let mut handles = vec![];
    for check in checks {
        handles.push(tokio::spawn(async move {
            CheckResult {
                name: check.name().to_string(),
                status: check.execute().await,
                fix_message: check.fix_message(),
            }
        }));
    }

    let mut results = vec![];
    for handle in handles {
        if let Ok(result) = handle.await {
            results.push(result);
        }
    }
    results
}

pub fn print_results(results: &[CheckResult]) {
    if get_output_format() == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(results).unwrap_or_default());
        return;
    }

    println!("{: <14} [{}] {}", "Check".bold(), "Status".bold(), "Message".bold());
    for result in results {
        println!(
            "{: <14} [{}] {}",
            result.name,
            result.status.color_status(),
            result.status.message()
        );
    }

    let fixes: Vec<&CheckResult> = results
        .iter()
        .filter(|r| r.status.is_failure() && r.fix_message.is_some())
        .collect();
    if !fixes.is_empty() {
        println!("{}", "\nAvailable fixes:".bold().yellow());
        for result in fixes {
            if let Some(msg) = &result.fix_message {
                println!("  - {}: {}", result.name, msg);
            }
        }
    }
}

pub async fn handle_doctor(config: &EditorConfig) -> Result<()> {
    let results = run_all_checks(default_checks(config)).await;
    print_results(&results);
    if results.iter().any(|r| r.status.is_failure()) {
        anyhow::bail!("Some checks failed");
    }
    Ok(())
}
