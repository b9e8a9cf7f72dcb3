//! Progress reporting for a running render.
//!
//! The orchestrator only ever sees [`ProgressInfo`] events. How they are
//! derived from the processor's output is up to a [`ProgressSource`]; the
//! default one scrapes `time=HH:MM:SS` markers from ffmpeg's stderr.

use std::time::Instant;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref TIME_MARKER: Regex =
        Regex::new(r"time=(\d{2}):(\d{2}):(\d{2})").expect("valid time marker pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Preparing,
    Processing,
    Encoding,
    Finalizing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressInfo {
    pub stage: ProgressStage,
    pub percent: u8,
    /// Estimated seconds remaining.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<u64>,
}

impl ProgressInfo {
    pub fn preparing() -> Self {
        Self {
            stage: ProgressStage::Preparing,
            percent: 0,
            eta: None,
        }
    }

    pub fn finished() -> Self {
        Self {
            stage: ProgressStage::Finalizing,
            percent: 100,
            eta: None,
        }
    }
}

/// Turns chunks of processor output into progress events.
pub trait ProgressSource: Send {
    /// Called for every chunk read from the processor.
    fn observe(&mut self, chunk: &str) -> Option<ProgressInfo>;

    /// Called once the processor exited cleanly.
    fn finished(&mut self) -> ProgressInfo {
        ProgressInfo::finished()
    }
}

/// Estimates progress from ffmpeg's `time=` marker against the expected
/// output duration. Stays at or below 99% until the process exits.
pub struct StderrTimeProgress {
    total_duration: f64,
    started: Instant,
}

impl StderrTimeProgress {
    pub fn new(total_duration: f64) -> Self {
        Self {
            total_duration,
            started: Instant::now(),
        }
    }

    pub(crate) fn percent_at(&self, current: f64) -> Option<u8> {
        if self.total_duration <= 0.0 {
            return None;
        }
        let percent = (current / self.total_duration * 100.0).round().clamp(0.0, 99.0);
        Some(percent as u8)
    }
}

/// Seconds encoded by the last `time=HH:MM:SS` marker in `chunk`.
pub fn parse_time_marker(chunk: &str) -> Option<f64> {
    let caps = TIME_MARKER.captures_iter(chunk).last()?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

impl ProgressSource for StderrTimeProgress {
    fn observe(&mut self, chunk: &str) -> Option<ProgressInfo> {
        let current = parse_time_marker(chunk)?;
        let percent = self.percent_at(current)?;
        let eta = (percent > 0).then(|| {
            let elapsed = self.started.elapsed().as_secs_f64();
            ((100.0 - percent as f64) / percent as f64 * elapsed).round() as u64
        });
        Some(ProgressInfo {
            stage: ProgressStage::Processing,
            percent,
            eta,
        })
    }
}
