//! Audio track model: constructors, mixing arithmetic and volume helpers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::clip::{Clip, generate_id};
use crate::presets::defaults;

/// Assumed length of a looped source whose trim end is unknown.
pub const DEFAULT_LOOP_WINDOW: f64 = 300.0;

/// Volume music is lowered to while a voiceover plays.
pub const DEFAULT_DUCK_LEVEL: f64 = 0.3;

/// What a track is for. Ducking and conflict checks key off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AudioRole {
    Music,
    Voiceover,
    SoundEffect,
    #[default]
    Other,
}

fn default_track_id() -> String {
    generate_id("audio")
}

fn default_track_volume() -> f64 {
    defaults::MUSIC_VOLUME
}

fn default_fade() -> f64 {
    defaults::AUDIO_FADE_DURATION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    #[serde(default = "default_track_id")]
    pub id: String,
    pub source: PathBuf,
    #[serde(default)]
    pub role: AudioRole,
    /// Where the track starts in the output, in seconds.
    #[serde(default)]
    pub start_at: f64,
    /// Window inside the source file itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_end: Option<f64>,
    #[serde(default = "default_track_volume")]
    pub volume: f64,
    #[serde(default = "default_fade")]
    pub fade_in: f64,
    #[serde(default = "default_fade")]
    pub fade_out: f64,
    #[serde(default, rename = "loop")]
    pub looped: bool,
}

impl AudioTrack {
    /// A generic track with the library defaults (music volume, 1 s fades).
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            id: default_track_id(),
            source: source.into(),
            role: AudioRole::Other,
            start_at: 0.0,
            trim_start: None,
            trim_end: None,
            volume: defaults::MUSIC_VOLUME,
            fade_in: defaults::AUDIO_FADE_DURATION,
            fade_out: defaults::AUDIO_FADE_DURATION,
            looped: false,
        }
    }

    /// Looping music bed: quiet, with long fades.
    pub fn background_music(source: impl Into<PathBuf>) -> Self {
        Self {
            id: "background-music".into(),
            role: AudioRole::Music,
            volume: 0.3,
            fade_in: 2.0,
            fade_out: 3.0,
            looped: true,
            ..Self::new(source)
        }
    }

    /// Full-volume narration with short anti-pop fades.
    pub fn voiceover(source: impl Into<PathBuf>) -> Self {
        Self {
            id: "voiceover".into(),
            role: AudioRole::Voiceover,
            volume: 1.0,
            fade_in: 0.1,
            fade_out: 0.1,
            ..Self::new(source)
        }
    }

    pub fn sound_effect(source: impl Into<PathBuf>, start_at: f64) -> Self {
        Self {
            id: generate_id("sfx"),
            role: AudioRole::SoundEffect,
            start_at,
            volume: 0.8,
            fade_in: 0.0,
            fade_out: 0.0,
            ..Self::new(source)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn starting_at(mut self, seconds: f64) -> Self {
        self.start_at = seconds;
        self
    }

    pub fn trimmed(mut self, start: Option<f64>, end: Option<f64>) -> Self {
        self.trim_start = start;
        self.trim_end = end;
        self
    }

    pub fn with_fades(mut self, fade_in: f64, fade_out: f64) -> Self {
        self.fade_in = fade_in;
        self.fade_out = fade_out;
        self
    }

    pub fn looping(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn has_trim(&self) -> bool {
        self.trim_start.is_some() || self.trim_end.is_some()
    }

    /// Length of one pass through the source window.
    pub fn loop_window(&self) -> f64 {
        let window = self.trim_end.unwrap_or(DEFAULT_LOOP_WINDOW) - self.trim_start.unwrap_or(0.0);
        if window > 0.0 {
            window
        } else {
            DEFAULT_LOOP_WINDOW
        }
    }

    /// Repetitions needed so the looped window covers `video_duration`.
    ///
    /// One extra pass is added so trimming at the end never runs short.
    pub fn loop_count(&self, video_duration: f64) -> u32 {
        (video_duration.max(0.0) / self.loop_window()).ceil() as u32 + 1
    }
}

/// Seconds of music needed to cover the given clips.
pub fn calculate_required_music_duration(clips: &[Clip], transition_overlap: f64) -> f64 {
    crate::clip::calculate_total_duration(clips) - transition_overlap
}

/// Make sure a track that ends before the video fades out instead of cutting.
pub fn fit_audio_to_video(track: &AudioTrack, video_duration: f64) -> AudioTrack {
    let mut adjusted = track.clone();
    if track.trim_end.is_some_and(|end| end < video_duration) {
        adjusted.fade_out = track.fade_out.max(1.0);
    }
    adjusted
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DuckingRange {
    pub start_time: f64,
    pub end_time: f64,
    pub target_volume: f64,
}

/// Timeline range where music should sit under the voiceover.
pub fn calculate_ducking_ranges(
    voiceover: &AudioTrack,
    voiceover_duration: f64,
    duck_level: f64,
) -> Vec<DuckingRange> {
    let trim_start = voiceover.trim_start.unwrap_or(0.0);
    let trim_end = voiceover.trim_end.unwrap_or(voiceover_duration);
    vec![DuckingRange {
        start_time: voiceover.start_at,
        end_time: voiceover.start_at + (trim_end - trim_start),
        target_volume: duck_level,
    }]
}

/// Track length when both trim points are known.
pub fn estimate_track_duration(track: &AudioTrack) -> Option<f64> {
    Some(track.trim_end? - track.trim_start?)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioConflicts {
    pub has_conflict: bool,
    pub message: Option<String>,
}

pub fn detect_audio_conflicts(tracks: &[AudioTrack]) -> AudioConflicts {
    let conflict = |message: String| AudioConflicts {
        has_conflict: true,
        message: Some(message),
    };

    let voiceovers = tracks
        .iter()
        .filter(|t| t.role == AudioRole::Voiceover)
        .count();
    if voiceovers > 1 {
        return conflict("Multiple voiceover tracks detected. Consider merging them.".into());
    }

    let effects: Vec<&AudioTrack> = tracks
        .iter()
        .filter(|t| t.role == AudioRole::SoundEffect)
        .collect();
    for (i, a) in effects.iter().enumerate() {
        for b in &effects[i + 1..] {
            if a.start_at == b.start_at {
                return conflict(format!(
                    "Sound effects \"{}\" and \"{}\" start at the same time.",
                    a.id, b.id
                ));
            }
        }
    }

    AudioConflicts::default()
}

pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

pub fn linear_to_db(linear: f64) -> f64 {
    20.0 * linear.log10()
}

/// Map `value` from `[min, max]` onto `[0, 1]`, clamped.
pub fn normalize_volume(value: f64, min: f64, max: f64) -> f64 {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}
