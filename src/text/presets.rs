//! Named text styles for titles, hooks, captions, lower thirds and CTAs.

use serde::Serialize;

use super::{
    BackgroundConfig, BoxPadding, FontConfig, FontWeight, PositionPreset, ShadowConfig,
    StrokeConfig, TextStyle, TextTransform,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextPresetCategory {
    Title,
    Hook,
    Subtitle,
    Caption,
    LowerThird,
    Cta,
}

impl TextPresetCategory {
    pub const ALL: [TextPresetCategory; 6] = [
        TextPresetCategory::Title,
        TextPresetCategory::Hook,
        TextPresetCategory::Subtitle,
        TextPresetCategory::Caption,
        TextPresetCategory::LowerThird,
        TextPresetCategory::Cta,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStylePreset {
    /// Lookup key, e.g. `title-impact`.
    pub key: &'static str,
    pub name: &'static str,
    pub category: TextPresetCategory,
    pub description: &'static str,
    pub default_position: PositionPreset,
    pub style: TextStyle,
}

fn stroke(color: &str, width: u32) -> Option<StrokeConfig> {
    Some(StrokeConfig {
        color: color.into(),
        width,
    })
}

fn shadow(color: &str, offset_x: i32, offset_y: i32, blur: Option<u32>) -> Option<ShadowConfig> {
    Some(ShadowConfig {
        color: color.into(),
        offset_x,
        offset_y,
        blur,
    })
}

fn boxed(color: &str, x: u32, y: u32, radius: Option<u32>) -> Option<BackgroundConfig> {
    Some(BackgroundConfig {
        color: color.into(),
        padding: BoxPadding::Axes { x, y },
        border_radius: radius,
        border: None,
    })
}

struct PresetRow {
    key: &'static str,
    name: &'static str,
    category: TextPresetCategory,
    description: &'static str,
    position: PositionPreset,
    font: FontConfig,
    color: &'static str,
    stroke: Option<StrokeConfig>,
    shadow: Option<ShadowConfig>,
    background: Option<BackgroundConfig>,
    upper: bool,
}

impl PresetRow {
    fn build(self) -> TextStylePreset {
        TextStylePreset {
            key: self.key,
            name: self.name,
            category: self.category,
            description: self.description,
            default_position: self.position,
            style: TextStyle {
                font: self.font,
                color: self.color.into(),
                stroke: self.stroke,
                shadow: self.shadow,
                background: self.background,
                transform: if self.upper {
                    TextTransform::Uppercase
                } else {
                    TextTransform::None
                },
                opacity: None,
            },
        }
    }
}

/// Every built-in preset, grouped title, hook, subtitle/caption, lower
/// third, CTA.
pub fn all_presets() -> Vec<TextStylePreset> {
    use FontWeight::*;
    use PositionPreset::*;
    use TextPresetCategory::*;

    let f = FontConfig::new;
    let specs = vec![
        PresetRow {
            key: "title-impact",
            name: "Impact Title",
            category: Title,
            description: "Bold, attention-grabbing title with thick stroke",
            position: MiddleCenter,
            font: f("Impact", 96).weight(Regular),
            color: "#FFFFFF",
            stroke: stroke("#000000", 4),
            shadow: shadow("rgba(0,0,0,0.8)", 4, 4, None),
            background: None,
            upper: true,
        },
        PresetRow {
            key: "title-modern",
            name: "Modern Title",
            category: Title,
            description: "Clean, modern title with subtle shadow",
            position: MiddleCenter,
            font: f("Montserrat", 80),
            color: "#FFFFFF",
            stroke: None,
            shadow: shadow("rgba(0,0,0,0.5)", 2, 2, Some(4)),
            background: None,
            upper: false,
        },
        PresetRow {
            key: "title-neon",
            name: "Neon Title",
            category: Title,
            description: "Neon glow effect for attention-grabbing titles",
            position: MiddleCenter,
            font: f("Bebas Neue", 100).weight(Regular),
            color: "#00FFFF",
            stroke: stroke("#FF00FF", 3),
            shadow: shadow("#00FFFF", 0, 0, Some(20)),
            background: None,
            upper: true,
        },
        PresetRow {
            key: "title-comic",
            name: "Comic Title",
            category: Title,
            description: "Fun, playful comic book style",
            position: MiddleCenter,
            font: f("Bangers", 90).weight(Regular).letter_spacing(2.0),
            color: "#FFFF00",
            stroke: stroke("#FF0000", 4),
            shadow: shadow("#000000", 6, 6, None),
            background: None,
            upper: true,
        },
        PresetRow {
            key: "title-minimal",
            name: "Minimal Title",
            category: Title,
            description: "Clean, minimalist style",
            position: MiddleCenter,
            font: f("Inter", 72).weight(Light).letter_spacing(4.0),
            color: "#FFFFFF",
            stroke: None,
            shadow: None,
            background: None,
            upper: true,
        },
        PresetRow {
            key: "title-cinematic",
            name: "Cinematic Title",
            category: Title,
            description: "Movie trailer style title",
            position: MiddleCenter,
            font: f("Oswald", 88).letter_spacing(8.0),
            color: "#FFFFFF",
            stroke: stroke("#000000", 2),
            shadow: None,
            background: None,
            upper: true,
        },
        PresetRow {
            key: "hook-tiktok",
            name: "TikTok Hook",
            category: Hook,
            description: "Bold, centered hook text like popular TikToks",
            position: MiddleCenter,
            font: f("Arial Black", 72).weight(Regular),
            color: "#FFFFFF",
            stroke: stroke("#000000", 4),
            shadow: None,
            background: None,
            upper: true,
        },
        PresetRow {
            key: "hook-youtube",
            name: "YouTube Hook",
            category: Hook,
            description: "YouTube thumbnail style text",
            position: BottomCenter,
            font: f("Anton", 80).weight(Regular),
            color: "#FFFF00",
            stroke: stroke("#000000", 5),
            shadow: shadow("#000000", 4, 4, None),
            background: None,
            upper: true,
        },
        PresetRow {
            key: "hook-urgent",
            name: "Urgent Hook",
            category: Hook,
            description: "Breaking news / urgent style",
            position: TopCenter,
            font: f("Roboto", 56).weight(Black),
            color: "#FFFFFF",
            stroke: None,
            shadow: None,
            background: boxed("#FF0000", 24, 12, Some(4)),
            upper: true,
        },
        PresetRow {
            key: "hook-question",
            name: "Question Hook",
            category: Hook,
            description: "Engaging question style",
            position: MiddleCenter,
            font: f("Poppins", 64),
            color: "#FFFFFF",
            stroke: stroke("#000000", 3),
            shadow: None,
            background: None,
            upper: false,
        },
        PresetRow {
            key: "hook-highlight",
            name: "Highlight Hook",
            category: Hook,
            description: "Highlighted key phrase",
            position: MiddleCenter,
            font: f("Montserrat", 60).weight(ExtraBold),
            color: "#000000",
            stroke: None,
            shadow: None,
            background: boxed("#FFFF00", 16, 8, Some(4)),
            upper: true,
        },
        PresetRow {
            key: "subtitle-classic",
            name: "Classic Subtitle",
            category: Subtitle,
            description: "Traditional white text with black outline",
            position: BottomCenter,
            font: f("Arial", 48),
            color: "#FFFFFF",
            stroke: stroke("#000000", 2),
            shadow: None,
            background: None,
            upper: false,
        },
        PresetRow {
            key: "subtitle-tiktok",
            name: "TikTok Caption",
            category: Caption,
            description: "Bold centered captions like TikTok",
            position: MiddleCenter,
            font: f("Arial Black", 56).weight(Regular),
            color: "#FFFFFF",
            stroke: stroke("#000000", 3),
            shadow: None,
            background: None,
            upper: true,
        },
        PresetRow {
            key: "subtitle-netflix",
            name: "Netflix Style",
            category: Subtitle,
            description: "Clean Netflix-style subtitles",
            position: BottomCenter,
            font: f("Open Sans", 44).weight(SemiBold),
            color: "#FFFFFF",
            stroke: None,
            shadow: shadow("rgba(0,0,0,0.8)", 2, 2, Some(4)),
            background: None,
            upper: false,
        },
        PresetRow {
            key: "subtitle-boxed",
            name: "Boxed Subtitle",
            category: Subtitle,
            description: "Text with semi-transparent background",
            position: BottomCenter,
            font: f("Roboto", 42).weight(Medium),
            color: "#FFFFFF",
            stroke: None,
            shadow: None,
            background: boxed("rgba(0,0,0,0.7)", 16, 8, Some(4)),
            upper: false,
        },
        PresetRow {
            key: "subtitle-karaoke",
            name: "Karaoke Style",
            category: Caption,
            description: "Word-by-word highlight style",
            position: BottomCenter,
            font: f("Poppins", 52),
            color: "#FFFFFF",
            stroke: None,
            shadow: None,
            background: boxed("rgba(0,0,0,0.6)", 12, 8, Some(8)),
            upper: false,
        },
        PresetRow {
            key: "subtitle-mrbeast",
            name: "MrBeast Style",
            category: Caption,
            description: "Bold highlighted words like MrBeast videos",
            position: MiddleCenter,
            font: f("Impact", 64).weight(Regular),
            color: "#FFFF00",
            stroke: stroke("#000000", 4),
            shadow: None,
            background: boxed("#000000", 8, 4, None),
            upper: true,
        },
        PresetRow {
            key: "lower-third-news",
            name: "News Lower Third",
            category: LowerThird,
            description: "Professional news broadcast style",
            position: BottomLeft,
            font: f("Roboto", 36),
            color: "#FFFFFF",
            stroke: None,
            shadow: None,
            background: boxed("#1a1a1a", 20, 12, None).map(|bg| BackgroundConfig {
                border: stroke("#FF0000", 3),
                ..bg
            }),
            upper: false,
        },
        PresetRow {
            key: "lower-third-modern",
            name: "Modern Lower Third",
            category: LowerThird,
            description: "Clean modern style name tag",
            position: BottomLeft,
            font: f("Inter", 32).weight(SemiBold),
            color: "#FFFFFF",
            stroke: None,
            shadow: None,
            background: boxed("rgba(0,0,0,0.8)", 24, 16, Some(8)),
            upper: false,
        },
        PresetRow {
            key: "lower-third-minimal",
            name: "Minimal Lower Third",
            category: LowerThird,
            description: "Simple text with underline accent",
            position: BottomLeft,
            font: f("Montserrat", 28).weight(Medium),
            color: "#FFFFFF",
            stroke: None,
            shadow: shadow("rgba(0,0,0,0.6)", 1, 1, None),
            background: None,
            upper: false,
        },
        PresetRow {
            key: "cta-subscribe",
            name: "Subscribe CTA",
            category: Cta,
            description: "YouTube subscribe button style",
            position: BottomRight,
            font: f("Roboto", 32),
            color: "#FFFFFF",
            stroke: None,
            shadow: None,
            background: boxed("#FF0000", 20, 10, Some(4)),
            upper: true,
        },
        PresetRow {
            key: "cta-swipe",
            name: "Swipe Up CTA",
            category: Cta,
            description: "Instagram swipe up style",
            position: BottomCenter,
            font: f("Poppins", 28).weight(SemiBold),
            color: "#FFFFFF",
            stroke: stroke("#000000", 1),
            shadow: None,
            background: None,
            upper: false,
        },
        PresetRow {
            key: "cta-link",
            name: "Link CTA",
            category: Cta,
            description: "Link in bio style",
            position: BottomCenter,
            font: f("Inter", 26).weight(Medium),
            color: "#FFFFFF",
            stroke: None,
            shadow: None,
            background: boxed("rgba(0,0,0,0.7)", 16, 8, Some(20)),
            upper: false,
        },
    ];

    specs.into_iter().map(PresetRow::build).collect()
}

pub fn get_preset(key: &str) -> Option<TextStylePreset> {
    all_presets().into_iter().find(|p| p.key == key)
}

pub fn preset_names() -> Vec<&'static str> {
    all_presets().iter().map(|p| p.key).collect()
}

pub fn presets_by_category(category: TextPresetCategory) -> Vec<TextStylePreset> {
    all_presets()
        .into_iter()
        .filter(|p| p.category == category)
        .collect()
}
