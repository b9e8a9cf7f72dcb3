//! Clip model and cut operations.
//!
//! Clips are value objects: every operation here returns new clips and leaves
//! its input untouched.

use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// Generate an id like `clip-k3x9q`.
pub fn generate_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    format!("{prefix}-{suffix}")
}

fn default_clip_id() -> String {
    generate_id("clip")
}

fn default_volume() -> f64 {
    1.0
}

/// A reference to a source video with an optional trim window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    #[serde(default = "default_clip_id")]
    pub id: String,
    pub source: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub muted: bool,
}

impl Clip {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            id: default_clip_id(),
            source: source.into(),
            start_time: None,
            end_time: None,
            duration: None,
            volume: 1.0,
            muted: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    /// A clip of `source` between `start` and `end` seconds.
    ///
    /// `end <= start` is not rejected here; [`validate_clip`] reports it.
    pub fn trimmed(source: impl Into<PathBuf>, start: f64, end: f64) -> Self {
        Self {
            start_time: Some(start),
            end_time: Some(end),
            duration: Some(end - start),
            ..Self::new(source)
        }
    }

    /// Trim window when both ends are set.
    pub fn trim_window(&self) -> Option<(f64, f64)> {
        Some((self.start_time?, self.end_time?))
    }

    /// Effective duration in seconds, `0.0` when unknown.
    ///
    /// A trim window wins over the explicit duration.
    pub fn effective_duration(&self) -> f64 {
        if let Some((start, end)) = self.trim_window() {
            return end - start;
        }
        self.duration.unwrap_or(0.0)
    }

    fn window(&self) -> (f64, f64) {
        let start = self.start_time.unwrap_or(0.0);
        let end = self
            .end_time
            .unwrap_or(start + self.duration.unwrap_or(0.0));
        (start, end)
    }

    fn derive(&self, id: String, start: f64, end: f64) -> Self {
        Self {
            id,
            source: self.source.clone(),
            start_time: Some(start),
            end_time: Some(end),
            duration: Some(end - start),
            volume: self.volume,
            muted: self.muted,
        }
    }
}

/// Clips for each `(start, end)` range of one source, ids `clip-1..`.
pub fn split_into_clips(source: &Path, ranges: &[(f64, f64)]) -> Vec<Clip> {
    ranges
        .iter()
        .enumerate()
        .map(|(index, &(start, end))| {
            Clip::trimmed(source, start, end).with_id(format!("clip-{}", index + 1))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutAction {
    Keep,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub action: CutAction,
}

impl CutSegment {
    pub fn keep(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time,
            end_time,
            action: CutAction::Keep,
        }
    }
}

/// Segments to keep or remove from one source clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutConfig {
    pub source: Clip,
    pub segments: Vec<CutSegment>,
}

impl CutConfig {
    pub fn keep(source: impl Into<PathBuf>, ranges: &[(f64, f64)]) -> Self {
        Self {
            source: Clip::new(source),
            segments: ranges
                .iter()
                .map(|&(start, end)| CutSegment::keep(start, end))
                .collect(),
        }
    }

    /// Express removed ranges as the kept complement within `total_duration`.
    pub fn remove(source: impl Into<PathBuf>, ranges: &[(f64, f64)], total_duration: f64) -> Self {
        let mut sorted = ranges.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut segments = Vec::new();
        let mut cursor = 0.0_f64;
        for (start, end) in sorted {
            if cursor < start {
                segments.push(CutSegment::keep(cursor, start));
            }
            cursor = cursor.max(end);
        }
        if cursor < total_duration {
            segments.push(CutSegment::keep(cursor, total_duration));
        }

        Self {
            source: Clip::new(source),
            segments,
        }
    }

    /// One clip per kept segment, ids `<source id>-segment-<n>`.
    pub fn to_clips(&self) -> Vec<Clip> {
        self.segments
            .iter()
            .filter(|segment| segment.action == CutAction::Keep)
            .enumerate()
            .map(|(index, segment)| {
                self.source.derive(
                    format!("{}-segment-{}", self.source.id, index + 1),
                    segment.start_time,
                    segment.end_time,
                )
            })
            .collect()
    }
}

pub fn extend_clip(clip: &Clip, seconds: f64) -> Clip {
    let (_, end) = clip.window();
    Clip {
        end_time: Some(end + seconds),
        duration: Some(clip.duration.unwrap_or(0.0) + seconds),
        ..clip.clone()
    }
}

/// Shorten a clip from its end, never below 0.1 s.
pub fn shorten_clip(clip: &Clip, seconds: f64) -> Clip {
    let duration = (clip.effective_duration() - seconds).max(0.1);
    let start = clip.start_time.unwrap_or(0.0);
    Clip {
        end_time: Some(start + duration),
        duration: Some(duration),
        ..clip.clone()
    }
}

/// Move the trim window, keeping its length. The start never goes below zero.
pub fn shift_clip(clip: &Clip, offset: f64) -> Clip {
    let duration = clip.effective_duration();
    let start = (clip.start_time.unwrap_or(0.0) + offset).max(0.0);
    Clip {
        start_time: Some(start),
        end_time: Some(start + duration),
        ..clip.clone()
    }
}

/// Split a clip at `time` (in source seconds) into `<id>-a` and `<id>-b`.
pub fn split_clip_at(clip: &Clip, time: f64) -> Result<(Clip, Clip), EditError> {
    let (start, end) = clip.window();
    if time <= start || time >= end {
        return Err(EditError::SplitOutOfRange { time, start, end });
    }
    Ok((
        clip.derive(format!("{}-a", clip.id), start, time),
        clip.derive(format!("{}-b", clip.id), time, end),
    ))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClipValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

pub fn validate_clip(clip: &Clip) -> ClipValidation {
    let mut errors = Vec::new();

    if clip.start_time.is_some_and(|start| start < 0.0) {
        errors.push("Start time cannot be negative".to_string());
    }
    if let Some((start, end)) = clip.trim_window()
        && end <= start
    {
        errors.push("End time must be greater than start time".to_string());
    }
    if clip.duration.is_some_and(|duration| duration <= 0.0) {
        errors.push("Duration must be positive".to_string());
    }
    if !(0.0..=2.0).contains(&clip.volume) {
        errors.push("Volume should be between 0 and 2".to_string());
    }

    ClipValidation {
        valid: errors.is_empty(),
        errors,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipError {
    pub clip_id: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClipsValidation {
    pub valid: bool,
    pub errors: Vec<ClipError>,
}

impl ClipsValidation {
    /// Flatten into `id: message` strings.
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|e| e.errors.iter().map(move |m| format!("{}: {m}", e.clip_id)))
            .collect()
    }
}

/// Validate every clip, collecting all problems instead of stopping early.
pub fn validate_clips(clips: &[Clip]) -> ClipsValidation {
    let errors: Vec<ClipError> = clips
        .iter()
        .filter_map(|clip| {
            let result = validate_clip(clip);
            (!result.valid).then(|| ClipError {
                clip_id: clip.id.clone(),
                errors: result.errors,
            })
        })
        .collect();

    ClipsValidation {
        valid: errors.is_empty(),
        errors,
    }
}

/// Uniform trim settings for [`batch_create_clips`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub volume: Option<f64>,
    pub muted: bool,
}

pub fn batch_create_clips<P: AsRef<Path>>(sources: &[P], options: BatchOptions) -> Vec<Clip> {
    sources
        .iter()
        .enumerate()
        .map(|(index, source)| Clip {
            id: format!("clip-{}", index + 1),
            source: source.as_ref().to_path_buf(),
            start_time: options.start_time,
            end_time: options
                .start_time
                .zip(options.duration)
                .map(|(start, duration)| start + duration),
            duration: options.duration,
            volume: options.volume.unwrap_or(1.0),
            muted: options.muted,
        })
        .collect()
}

pub fn calculate_total_duration(clips: &[Clip]) -> f64 {
    clips.iter().map(Clip::effective_duration).sum()
}

/// Rearrange clips; `order[i]` is the index of the clip placed at position `i`.
pub fn reorder_clips(clips: &[Clip], order: &[usize]) -> Result<Vec<Clip>, EditError> {
    if order.len() != clips.len() {
        return Err(EditError::LengthMismatch {
            expected: clips.len(),
            got: order.len(),
        });
    }
    order
        .iter()
        .map(|&index| {
            clips.get(index).cloned().ok_or(EditError::IndexOutOfRange {
                index,
                len: clips.len(),
            })
        })
        .collect()
}

pub fn remove_clip_at(clips: &[Clip], index: usize) -> Result<Vec<Clip>, EditError> {
    if index >= clips.len() {
        return Err(EditError::IndexOutOfRange {
            index,
            len: clips.len(),
        });
    }
    let mut out = clips.to_vec();
    out.remove(index);
    Ok(out)
}

/// Insert before `index`; `index == len` appends.
pub fn insert_clip_at(clips: &[Clip], clip: Clip, index: usize) -> Result<Vec<Clip>, EditError> {
    if index > clips.len() {
        return Err(EditError::IndexOutOfRange {
            index,
            len: clips.len(),
        });
    }
    let mut out = clips.to_vec();
    out.insert(index, clip);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(clips: &[Clip]) -> Vec<&str> {
        clips.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn trimmed_clip_has_consistent_duration() {
        let clip = Clip::trimmed("a.mp4", 2.0, 5.5);
        assert_eq!(clip.duration, Some(3.5));
        assert_eq!(clip.effective_duration(), 3.5);
        assert!(clip.id.starts_with("clip-"));
        assert!(validate_clip(&clip).valid);
    }

    #[test]
    fn inverted_trim_is_reported_not_rejected() {
        let clip = Clip::trimmed("a.mp4", 5.0, 2.0);
        let result = validate_clip(&clip);
        assert!(!result.valid);
        assert!(
            result
                .errors
                .contains(&"End time must be greater than start time".to_string())
        );
        assert!(result.errors.contains(&"Duration must be positive".to_string()));
    }

    #[test]
    fn effective_duration_prefers_trims() {
        let mut clip = Clip::new("a.mp4").with_duration(9.0);
        assert_eq!(clip.effective_duration(), 9.0);
        clip.start_time = Some(1.0);
        clip.end_time = Some(4.0);
        assert_eq!(clip.effective_duration(), 3.0);
        assert_eq!(Clip::new("b.mp4").effective_duration(), 0.0);
    }

    #[test]
    fn remove_ranges_become_sorted_complement() {
        let mut config = CutConfig::remove("talk.mp4", &[(8.0, 10.0), (2.0, 3.0)], 12.0);
        let ranges: Vec<(f64, f64)> = config
            .segments
            .iter()
            .map(|s| (s.start_time, s.end_time))
            .collect();
        assert_eq!(ranges, vec![(0.0, 2.0), (3.0, 8.0), (10.0, 12.0)]);

        config.source.id = "talk".into();
        let clips = config.to_clips();
        assert_eq!(ids(&clips), ["talk-segment-1", "talk-segment-2", "talk-segment-3"]);
        assert_eq!(clips[1].effective_duration(), 5.0);
    }

    #[test]
    fn removal_touching_the_end_leaves_no_tail() {
        let config = CutConfig::remove("a.mp4", &[(0.0, 1.0), (4.0, 6.0)], 6.0);
        assert_eq!(config.segments, vec![CutSegment::keep(1.0, 4.0)]);
    }

    #[test]
    fn split_produces_siblings() {
        let clip = Clip::trimmed("a.mp4", 1.0, 6.0).with_id("c").with_volume(0.5);
        let (before, after) = split_clip_at(&clip, 3.0).unwrap();
        assert_eq!((before.id.as_str(), after.id.as_str()), ("c-a", "c-b"));
        assert_eq!(before.trim_window(), Some((1.0, 3.0)));
        assert_eq!(after.trim_window(), Some((3.0, 6.0)));
        assert_eq!(after.volume, 0.5);
        assert_eq!(before.source, after.source);
    }

    #[test]
    fn split_outside_range_is_an_error() {
        let clip = Clip::trimmed("a.mp4", 1.0, 6.0);
        assert!(matches!(
            split_clip_at(&clip, 6.0),
            Err(EditError::SplitOutOfRange { .. })
        ));
        assert!(split_clip_at(&clip, 0.5).is_err());
    }

    #[test]
    fn extend_shorten_shift() {
        let clip = Clip::trimmed("a.mp4", 2.0, 4.0);

        let longer = extend_clip(&clip, 1.5);
        assert_eq!(longer.trim_window(), Some((2.0, 5.5)));

        let shorter = shorten_clip(&clip, 10.0);
        assert_eq!(shorter.duration, Some(0.1));
        assert_eq!(shorter.end_time, Some(2.1));

        let shifted = shift_clip(&clip, -5.0);
        assert_eq!(shifted.trim_window(), Some((0.0, 2.0)));
    }

    #[test]
    fn batch_operations_check_bounds() {
        let clips = batch_create_clips(
            &["a.mp4", "b.mp4", "c.mp4"],
            BatchOptions {
                start_time: Some(1.0),
                duration: Some(2.0),
                ..Default::default()
            },
        );
        assert_eq!(ids(&clips), ["clip-1", "clip-2", "clip-3"]);
        assert_eq!(clips[0].end_time, Some(3.0));
        assert_eq!(calculate_total_duration(&clips), 6.0);

        let reordered = reorder_clips(&clips, &[2, 0, 1]).unwrap();
        assert_eq!(ids(&reordered), ["clip-3", "clip-1", "clip-2"]);
        assert_eq!(
            reorder_clips(&clips, &[0, 1]).unwrap_err(),
            EditError::LengthMismatch {
                expected: 3,
                got: 2
            }
        );
        assert_eq!(
            reorder_clips(&clips, &[0, 1, 3]).unwrap_err(),
            EditError::IndexOutOfRange { index: 3, len: 3 }
        );

        let removed = remove_clip_at(&clips, 1).unwrap();
        assert_eq!(ids(&removed), ["clip-1", "clip-3"]);
        assert!(remove_clip_at(&clips, 3).is_err());

        let inserted = insert_clip_at(&clips, Clip::new("d.mp4").with_id("d"), 3).unwrap();
        assert_eq!(inserted.last().unwrap().id, "d");
        assert!(insert_clip_at(&clips, Clip::new("d.mp4"), 4).is_err());
    }

    #[test]
    fn validate_clips_aggregates_every_problem() {
        let clips = vec![
            Clip::new("ok.mp4").with_id("ok").with_duration(2.0),
            Clip::new("loud.mp4").with_id("loud").with_volume(3.0),
            Clip {
                start_time: Some(-1.0),
                ..Clip::new("neg.mp4").with_id("neg")
            },
        ];
        let result = validate_clips(&clips);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(
            result.messages(),
            vec![
                "loud: Volume should be between 0 and 2".to_string(),
                "neg: Start time cannot be negative".to_string(),
            ]
        );
    }

    #[test]
    fn split_into_clips_numbers_from_one() {
        let clips = split_into_clips(Path::new("a.mp4"), &[(0.0, 1.0), (2.0, 4.0)]);
        assert_eq!(ids(&clips), ["clip-1", "clip-2"]);
        assert_eq!(clips[1].duration, Some(2.0));
    }
}
