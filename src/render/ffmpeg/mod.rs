pub mod compiler;
pub mod graph;
pub mod progress;
pub mod services;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use duct::cmd;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref VERSION_LINE: Regex =
        Regex::new(r"ffmpeg version (\S+)").expect("valid version pattern");
}

/// The configured binary if given, otherwise `ffmpeg` from `PATH`.
pub fn resolve_ffmpeg_binary(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }
    which::which("ffmpeg").map_err(|err| anyhow!("ffmpeg was not found on PATH: {err}"))
}

pub fn check_ffmpeg_available(binary: &Path) -> bool {
    cmd!(binary, "-version")
        .stdout_null()
        .stderr_null()
        .unchecked()
        .run()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Version string reported by `ffmpeg -version`, e.g. `6.1.1`.
pub fn ffmpeg_version(binary: &Path) -> Result<String> {
    let output = cmd!(binary, "-version")
        .stderr_null()
        .read()
        .with_context(|| format!("Failed to run {} -version", binary.display()))?;
    parse_version(&output).ok_or_else(|| anyhow!("Unrecognized ffmpeg version output"))
}

fn parse_version(output: &str) -> Option<String> {
    VERSION_LINE
        .captures(output)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_read_from_banner() {
        let banner = "ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023 the FFmpeg developers\nbuilt with gcc 13";
        assert_eq!(parse_version(banner).as_deref(), Some("6.1.1-3ubuntu5"));
        assert_eq!(parse_version("something else"), None);
    }

    #[test]
    fn configured_binary_wins() {
        let path = Path::new("/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(resolve_ffmpeg_binary(Some(path)).unwrap(), path);
    }

    #[test]
    fn missing_binary_is_unavailable() {
        assert!(!check_ffmpeg_available(Path::new("/nonexistent/reelkit-ffmpeg")));
    }
}
