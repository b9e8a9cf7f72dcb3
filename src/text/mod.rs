//! Text overlay model: styled elements placed on the video independently of
//! subtitles, grouped into layers.

mod color;
mod fonts;
mod layout;
mod presets;

use serde::{Deserialize, Serialize};

use crate::clip::generate_id;
use crate::transitions::Easing;

pub use color::color_to_ffmpeg;
pub use fonts::{
    FONTS, FontCategory, FontMetadata, FontResolver, FontUse, fonts_by_category, fonts_for_use,
};
pub use layout::{calculate_font_size, wrap_text};
pub use presets::{
    TextPresetCategory, TextStylePreset, all_presets, get_preset, preset_names,
    presets_by_category,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Thin,
    ExtraLight,
    Light,
    #[default]
    #[serde(alias = "normal")]
    Regular,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    #[serde(alias = "bolder")]
    Black,
}

impl FontWeight {
    pub fn value(self) -> u16 {
        match self {
            FontWeight::Thin => 100,
            FontWeight::ExtraLight => 200,
            FontWeight::Light => 300,
            FontWeight::Regular => 400,
            FontWeight::Medium => 500,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
            FontWeight::ExtraBold => 800,
            FontWeight::Black => 900,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontWeight::Thin => "thin",
            FontWeight::ExtraLight => "extralight",
            FontWeight::Light => "light",
            FontWeight::Regular => "regular",
            FontWeight::Medium => "medium",
            FontWeight::SemiBold => "semibold",
            FontWeight::Bold => "bold",
            FontWeight::ExtraBold => "extrabold",
            FontWeight::Black => "black",
        }
    }

    pub fn is_bold(self) -> bool {
        self >= FontWeight::Bold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            TextTransform::None => text.to_string(),
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::Lowercase => text.to_lowercase(),
            TextTransform::Capitalize => {
                let mut out = String::with_capacity(text.len());
                let mut at_word_start = true;
                for c in text.chars() {
                    if at_word_start && c.is_alphabetic() {
                        out.extend(c.to_uppercase());
                    } else {
                        out.push(c);
                    }
                    at_word_start = c.is_whitespace();
                }
                out
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PositionPreset {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    #[default]
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// One axis of a custom position: pixels, a percentage like `"25%"`, or a raw
/// ffmpeg expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Pixels(f64),
    Expr(String),
}

impl Coordinate {
    /// Fraction of the frame when written as a percentage.
    pub fn percent(&self) -> Option<f64> {
        match self {
            Coordinate::Expr(expr) => expr.trim().strip_suffix('%')?.trim().parse::<f64>().ok().map(|p| p / 100.0),
            Coordinate::Pixels(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPosition {
    pub x: Coordinate,
    pub y: Coordinate,
    #[serde(default)]
    pub align_x: HorizontalAlign,
    #[serde(default)]
    pub align_y: VerticalAlign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextPosition {
    Preset(PositionPreset),
    Custom(CustomPosition),
}

impl Default for TextPosition {
    fn default() -> Self {
        TextPosition::Preset(PositionPreset::MiddleCenter)
    }
}

impl From<PositionPreset> for TextPosition {
    fn from(preset: PositionPreset) -> Self {
        TextPosition::Preset(preset)
    }
}

fn default_line_height() -> f64 {
    1.2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    pub family: String,
    pub size: u32,
    #[serde(default = "bold_weight")]
    pub weight: FontWeight,
    /// Line height multiplier, 1.0 = font size.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default)]
    pub letter_spacing: f64,
}

fn bold_weight() -> FontWeight {
    FontWeight::Bold
}

impl FontConfig {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::Bold,
            line_height: default_line_height(),
            letter_spacing: 0.0,
        }
    }

    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn letter_spacing(mut self, spacing: f64) -> Self {
        self.letter_spacing = spacing;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradientDirection {
    ToRight,
    ToLeft,
    ToTop,
    ToBottom,
    ToTopRight,
    ToTopLeft,
    ToBottomRight,
    ToBottomLeft,
}

/// Solid color or a gradient. drawtext cannot paint gradients, so only the
/// first gradient stop is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextColor {
    Solid(String),
    Gradient {
        direction: GradientDirection,
        colors: Vec<String>,
    },
}

impl TextColor {
    pub fn primary(&self) -> &str {
        match self {
            TextColor::Solid(color) => color,
            TextColor::Gradient { colors, .. } => colors.first().map(String::as_str).unwrap_or("#FFFFFF"),
        }
    }
}

impl From<&str> for TextColor {
    fn from(color: &str) -> Self {
        TextColor::Solid(color.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeConfig {
    pub color: String,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowConfig {
    pub color: String,
    pub offset_x: i32,
    pub offset_y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoxPadding {
    Uniform(u32),
    Axes { x: u32, y: u32 },
}

impl BoxPadding {
    /// drawtext only supports one border width, so axes are averaged.
    pub fn uniform(self) -> u32 {
        match self {
            BoxPadding::Uniform(p) => p,
            BoxPadding::Axes { x, y } => ((x + y) as f64 / 2.0).round() as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    pub color: String,
    pub padding: BoxPadding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<StrokeConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: FontConfig,
    pub color: TextColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<StrokeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundConfig>,
    #[serde(default)]
    pub transform: TextTransform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl TextStyle {
    pub fn new(font: FontConfig, color: impl Into<TextColor>) -> Self {
        Self {
            font,
            color: color.into(),
            stroke: None,
            shadow: None,
            background: None,
            transform: TextTransform::None,
            opacity: None,
        }
    }
}

impl From<String> for TextColor {
    fn from(color: String) -> Self {
        TextColor::Solid(color)
    }
}

fn default_text_id() -> String {
    generate_id("text")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    #[serde(default = "default_text_id")]
    pub id: String,
    /// Content; `\n` starts a new line.
    pub text: String,
    #[serde(default)]
    pub position: TextPosition,
    pub style: TextStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    /// Seconds of alpha ramp after `start_time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_in: Option<f64>,
    /// Seconds of alpha ramp before `end_time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_out: Option<f64>,
    /// Curve of both alpha ramps.
    #[serde(default = "linear")]
    pub fade_easing: Easing,
    #[serde(default)]
    pub z_index: i32,
}

fn linear() -> Easing {
    Easing::Linear
}

impl TextElement {
    /// Static text in the middle of the frame.
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            id: default_text_id(),
            text: text.into(),
            position: TextPosition::default(),
            style,
            start_time: None,
            end_time: None,
            fade_in: None,
            fade_out: None,
            fade_easing: Easing::Linear,
            z_index: 0,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn at(mut self, position: impl Into<TextPosition>) -> Self {
        self.position = position.into();
        self
    }

    pub fn between(mut self, start: f64, end: f64) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    pub fn fades(mut self, fade_in: Option<f64>, fade_out: Option<f64>) -> Self {
        self.fade_in = fade_in;
        self.fade_out = fade_out;
        self
    }

    pub fn fade_easing(mut self, easing: Easing) -> Self {
        self.fade_easing = easing;
        self
    }

    pub fn z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }
}

pub fn create_static_text(text: &str, position: TextPosition, style: TextStyle) -> TextElement {
    TextElement::new(text, style).at(position)
}

pub fn create_timed_text(
    text: &str,
    start: f64,
    end: f64,
    position: TextPosition,
    style: TextStyle,
) -> TextElement {
    TextElement::new(text, style).at(position).between(start, end)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    pub id: String,
    #[serde(default)]
    pub elements: Vec<TextElement>,
}

impl TextLayer {
    pub fn new(id: impl Into<String>, elements: Vec<TextElement>) -> Self {
        Self {
            id: id.into(),
            elements,
        }
    }

    /// Elements in paint order, lowest `z_index` first. Ties keep insertion order.
    pub fn sorted_elements(&self) -> Vec<&TextElement> {
        let mut elements: Vec<&TextElement> = self.elements.iter().collect();
        elements.sort_by_key(|e| e.z_index);
        elements
    }
}
