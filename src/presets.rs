//! Static preset tables: output geometry, platforms, quality levels and the
//! named subtitle/transition styles.
//!
//! Lookups by name return `None` for unknown keys; callers decide whether that
//! is fatal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::subtitles::{SubtitleAnimation, SubtitleStyle};
use crate::text::{FontWeight, TextTransform};
use crate::transitions::{Easing, Transition, TransitionType};

/// Video dimensions (width x height in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

macro_rules! named_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "9:16")]
    Vertical,
    #[serde(rename = "16:9")]
    Horizontal,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Portrait,
}

named_enum!(AspectRatio {
    Vertical => "9:16",
    Horizontal => "16:9",
    Square => "1:1",
    Portrait => "4:5",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Resolution {
    #[serde(rename = "720p")]
    Hd720,
    #[default]
    #[serde(rename = "1080p")]
    Hd1080,
    #[serde(rename = "4k")]
    Uhd4k,
}

named_enum!(Resolution {
    Hd720 => "720p",
    Hd1080 => "1080p",
    Uhd4k => "4k",
});

impl Resolution {
    /// Landscape base dimensions for this resolution.
    pub fn base(self) -> VideoDimensions {
        match self {
            Resolution::Hd720 => VideoDimensions::new(1280, 720),
            Resolution::Hd1080 => VideoDimensions::new(1920, 1080),
            Resolution::Uhd4k => VideoDimensions::new(3840, 2160),
        }
    }
}

/// Output frame size for an aspect ratio at a resolution.
///
/// The base resolution is reinterpreted rather than recomputed: vertical swaps
/// the landscape sides, square and portrait keep the short side as height.
pub fn dimensions(aspect_ratio: AspectRatio, resolution: Resolution) -> VideoDimensions {
    let base = resolution.base();
    match aspect_ratio {
        AspectRatio::Vertical => VideoDimensions::new(base.height, base.width),
        AspectRatio::Horizontal => base,
        AspectRatio::Square => VideoDimensions::new(base.height, base.height),
        AspectRatio::Portrait => {
            VideoDimensions::new((base.height as f64 * 0.8).round() as u32, base.height)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    #[default]
    Mp4,
    Webm,
    Mov,
}

named_enum!(VideoFormat {
    Mp4 => "mp4",
    Webm => "webm",
    Mov => "mov",
});

impl VideoFormat {
    pub fn extension(self) -> String {
        format!(".{}", self.as_str())
    }

    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| Self::parse(&ext.to_ascii_lowercase()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Draft,
    #[default]
    Normal,
    High,
    Best,
}

named_enum!(Quality {
    Draft => "draft",
    Normal => "normal",
    High => "high",
    Best => "best",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityPreset {
    pub video_bitrate: &'static str,
    pub audio_bitrate: &'static str,
    pub fps: u32,
}

impl Quality {
    pub fn preset(self) -> QualityPreset {
        let (video_bitrate, audio_bitrate, fps) = match self {
            Quality::Draft => ("2M", "128k", 24),
            Quality::Normal => ("5M", "192k", 30),
            Quality::High => ("8M", "256k", 30),
            Quality::Best => ("15M", "320k", 60),
        };
        QualityPreset {
            video_bitrate,
            audio_bitrate,
            fps,
        }
    }

    /// x264 constant rate factor used for this quality level.
    pub fn crf(self) -> u8 {
        match self {
            Quality::Draft => 28,
            Quality::Normal => 23,
            Quality::High => 20,
            Quality::Best => 18,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Tiktok,
    Reels,
    Shorts,
    Youtube,
    InstagramFeed,
}

named_enum!(Platform {
    Tiktok => "tiktok",
    Reels => "reels",
    Shorts => "shorts",
    Youtube => "youtube",
    InstagramFeed => "instagram_feed",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformPreset {
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub fps: u32,
    /// Longest upload the platform accepts, in seconds.
    pub max_duration: Option<u32>,
    pub video_bitrate: &'static str,
    pub audio_bitrate: &'static str,
}

impl Platform {
    pub fn preset(self) -> PlatformPreset {
        let vertical = |max_duration| PlatformPreset {
            aspect_ratio: AspectRatio::Vertical,
            resolution: Resolution::Hd1080,
            fps: 30,
            max_duration: Some(max_duration),
            video_bitrate: "8M",
            audio_bitrate: "192k",
        };
        match self {
            Platform::Tiktok => vertical(180),
            Platform::Reels => vertical(90),
            Platform::Shorts => vertical(60),
            Platform::Youtube => PlatformPreset {
                aspect_ratio: AspectRatio::Horizontal,
                resolution: Resolution::Hd1080,
                fps: 30,
                max_duration: None,
                video_bitrate: "10M",
                audio_bitrate: "256k",
            },
            Platform::InstagramFeed => PlatformPreset {
                aspect_ratio: AspectRatio::Portrait,
                resolution: Resolution::Hd1080,
                fps: 30,
                max_duration: Some(60),
                video_bitrate: "6M",
                audio_bitrate: "192k",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitlePreset {
    Classic,
    #[default]
    Tiktok,
    Highlight,
    Minimal,
    Neon,
    Karaoke,
}

named_enum!(SubtitlePreset {
    Classic => "classic",
    Tiktok => "tiktok",
    Highlight => "highlight",
    Minimal => "minimal",
    Neon => "neon",
    Karaoke => "karaoke",
});

impl SubtitlePreset {
    pub fn style(self) -> SubtitleStyle {
        let base = SubtitleStyle::default();
        match self {
            SubtitlePreset::Classic => SubtitleStyle {
                font_family: "Arial".into(),
                font_size: 48,
                font_weight: FontWeight::Bold,
                stroke_color: Some("#000000".into()),
                stroke_width: Some(2),
                position_y: 0.85,
                ..base
            },
            SubtitlePreset::Tiktok => SubtitleStyle {
                font_family: "Arial Black".into(),
                font_size: 56,
                font_weight: FontWeight::Black,
                stroke_color: Some("#000000".into()),
                stroke_width: Some(3),
                position_y: 0.5,
                text_transform: TextTransform::Uppercase,
                animation: SubtitleAnimation::Pop,
                ..base
            },
            SubtitlePreset::Highlight => SubtitleStyle {
                font_family: "Impact".into(),
                font_size: 64,
                font_color: "#FFFF00".into(),
                background_color: Some("#000000".into()),
                background_padding: Some(8),
                background_radius: Some(4),
                font_weight: FontWeight::Bold,
                position_y: 0.5,
                animation: SubtitleAnimation::Highlight,
                ..base
            },
            SubtitlePreset::Minimal => SubtitleStyle {
                font_family: "Helvetica Neue".into(),
                font_size: 42,
                position_y: 0.9,
                animation: SubtitleAnimation::Fade,
                ..base
            },
            SubtitlePreset::Neon => SubtitleStyle {
                font_family: "Arial Black".into(),
                font_size: 52,
                font_color: "#00FFFF".into(),
                stroke_color: Some("#FF00FF".into()),
                stroke_width: Some(2),
                font_weight: FontWeight::Bold,
                position_y: 0.5,
                animation: SubtitleAnimation::Pop,
                ..base
            },
            SubtitlePreset::Karaoke => SubtitleStyle {
                font_family: "Arial".into(),
                font_size: 48,
                background_color: Some("rgba(0, 0, 0, 0.7)".into()),
                background_padding: Some(12),
                background_radius: Some(8),
                font_weight: FontWeight::Bold,
                position_y: 0.85,
                animation: SubtitleAnimation::Highlight,
                ..base
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TransitionPreset {
    None,
    #[default]
    QuickFade,
    Crossfade,
    SlideLeft,
    Glitch,
    Flash,
    ZoomIn,
}

named_enum!(TransitionPreset {
    None => "none",
    QuickFade => "quickFade",
    Crossfade => "crossfade",
    SlideLeft => "slideLeft",
    Glitch => "glitch",
    Flash => "flash",
    ZoomIn => "zoomIn",
});

impl TransitionPreset {
    pub fn transition(self) -> Transition {
        let (kind, duration, easing) = match self {
            TransitionPreset::None => return Transition::none(),
            TransitionPreset::QuickFade => (TransitionType::Fade, 0.3, Easing::EaseInOut),
            TransitionPreset::Crossfade => (TransitionType::Crossfade, 0.5, Easing::EaseInOut),
            TransitionPreset::SlideLeft => (TransitionType::SlideLeft, 0.4, Easing::EaseOut),
            TransitionPreset::Glitch => (TransitionType::Glitch, 0.2, Easing::Linear),
            TransitionPreset::Flash => (TransitionType::Flash, 0.15, Easing::Linear),
            TransitionPreset::ZoomIn => (TransitionType::ZoomIn, 0.4, Easing::EaseOut),
        };
        Transition {
            kind,
            duration,
            easing,
        }
    }
}

/// Fallback values used when a pipeline leaves a setting unspecified.
pub mod defaults {
    use super::{AspectRatio, Quality, Resolution, SubtitlePreset, TransitionPreset, VideoFormat};

    pub const FORMAT: VideoFormat = VideoFormat::Mp4;
    pub const ASPECT_RATIO: AspectRatio = AspectRatio::Vertical;
    pub const RESOLUTION: Resolution = Resolution::Hd1080;
    pub const QUALITY: Quality = Quality::High;
    pub const FPS: u32 = 30;
    pub const TRANSITION: TransitionPreset = TransitionPreset::QuickFade;
    pub const SUBTITLE_STYLE: SubtitlePreset = SubtitlePreset::Tiktok;
    pub const VOLUME: f64 = 1.0;
    pub const MUSIC_VOLUME: f64 = 0.3;
    pub const AUDIO_FADE_DURATION: f64 = 1.0;
    pub const AUDIO_BITRATE: &str = "192k";
}

pub fn is_valid_aspect_ratio(value: &str) -> bool {
    AspectRatio::parse(value).is_some()
}

pub fn is_valid_resolution(value: &str) -> bool {
    Resolution::parse(value).is_some()
}

pub fn is_valid_quality(value: &str) -> bool {
    Quality::parse(value).is_some()
}

pub fn is_valid_platform(value: &str) -> bool {
    Platform::parse(value).is_some()
}
