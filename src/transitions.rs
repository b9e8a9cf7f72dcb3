//! Transition catalog.
//!
//! Every transition the editor knows about is listed in [`TRANSITIONS`] with its
//! duration bounds and the `xfade` primitive it compiles to. Clip-to-clip
//! durations are kept sane by [`auto_adjust_transitions`], which shortens
//! transitions that would swallow too much of a neighbouring clip.

use std::fmt;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TransitionType {
    #[default]
    None,
    Fade,
    Crossfade,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    ZoomIn,
    ZoomOut,
    WipeLeft,
    WipeRight,
    WipeUp,
    WipeDown,
    Blur,
    Pixelize,
    Rotate,
    Flip,
    Glitch,
    Flash,
    Shake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionCategory {
    Basic,
    Directional,
    Zoom,
    Wipe,
    Creative,
    Shortform,
}

impl TransitionCategory {
    pub const ALL: [TransitionCategory; 6] = [
        TransitionCategory::Basic,
        TransitionCategory::Directional,
        TransitionCategory::Zoom,
        TransitionCategory::Wipe,
        TransitionCategory::Creative,
        TransitionCategory::Shortform,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransitionCategory::Basic => "basic",
            TransitionCategory::Directional => "directional",
            TransitionCategory::Zoom => "zoom",
            TransitionCategory::Wipe => "wipe",
            TransitionCategory::Creative => "creative",
            TransitionCategory::Shortform => "shortform",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for TransitionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

/// Catalog entry describing one transition effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionDefinition {
    pub kind: TransitionType,
    pub name: &'static str,
    pub description: &'static str,
    pub default_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    /// Name of the `xfade` transition this compiles to; `None` for hard cuts.
    pub xfade: Option<&'static str>,
    pub category: TransitionCategory,
}

impl TransitionDefinition {
    pub fn uses_xfade(&self) -> bool {
        self.xfade.is_some()
    }
}

const fn def(
    kind: TransitionType,
    name: &'static str,
    description: &'static str,
    bounds: (f64, f64, f64),
    xfade: Option<&'static str>,
    category: TransitionCategory,
) -> TransitionDefinition {
    TransitionDefinition {
        kind,
        name,
        description,
        default_duration: bounds.0,
        min_duration: bounds.1,
        max_duration: bounds.2,
        xfade,
        category,
    }
}

/// Catalog in declaration order of [`TransitionType`].
pub const TRANSITIONS: [TransitionDefinition; 20] = {
    use TransitionCategory::*;
    use TransitionType as T;
    [
        def(T::None, "None", "Direct cut, no transition effect", (0.0, 0.0, 0.0), None, Basic),
        def(T::Fade, "Fade", "Fade to black between clips", (0.5, 0.1, 2.0), Some("fade"), Basic),
        def(T::Crossfade, "Crossfade", "Dissolve from one clip to another", (0.5, 0.1, 2.0), Some("dissolve"), Basic),
        def(T::SlideLeft, "Slide Left", "New clip slides in from the right", (0.4, 0.1, 1.5), Some("slideleft"), Directional),
        def(T::SlideRight, "Slide Right", "New clip slides in from the left", (0.4, 0.1, 1.5), Some("slideright"), Directional),
        def(T::SlideUp, "Slide Up", "New clip slides in from the bottom", (0.4, 0.1, 1.5), Some("slideup"), Directional),
        def(T::SlideDown, "Slide Down", "New clip slides in from the top", (0.4, 0.1, 1.5), Some("slidedown"), Directional),
        def(T::ZoomIn, "Zoom In", "Zoom into the next clip", (0.4, 0.1, 1.5), Some("smoothup"), Zoom),
        def(T::ZoomOut, "Zoom Out", "Zoom out to reveal next clip", (0.4, 0.1, 1.5), Some("smoothdown"), Zoom),
        def(T::WipeLeft, "Wipe Left", "Wipe transition moving left", (0.5, 0.1, 2.0), Some("wipeleft"), Wipe),
        def(T::WipeRight, "Wipe Right", "Wipe transition moving right", (0.5, 0.1, 2.0), Some("wiperight"), Wipe),
        def(T::WipeUp, "Wipe Up", "Wipe transition moving up", (0.5, 0.1, 2.0), Some("wipeup"), Wipe),
        def(T::WipeDown, "Wipe Down", "Wipe transition moving down", (0.5, 0.1, 2.0), Some("wipedown"), Wipe),
        def(T::Blur, "Blur", "Blur out then in", (0.5, 0.2, 1.5), Some("fadeblack"), Creative),
        def(T::Pixelize, "Pixelize", "Pixelation transition effect", (0.4, 0.2, 1.5), Some("pixelize"), Creative),
        def(T::Rotate, "Rotate", "Rotate to next clip", (0.5, 0.2, 1.5), Some("horzopen"), Creative),
        def(T::Flip, "Flip", "Flip transition between clips", (0.4, 0.2, 1.5), Some("vertopen"), Creative),
        def(T::Glitch, "Glitch", "Glitchy digital transition", (0.2, 0.1, 0.5), Some("diagtl"), Shortform),
        def(T::Flash, "Flash", "Quick white flash between clips", (0.15, 0.05, 0.5), Some("fadewhite"), Shortform),
        def(T::Shake, "Shake", "Camera shake effect on cut", (0.2, 0.1, 0.5), Some("diagbr"), Shortform),
    ]
};

impl TransitionType {
    pub fn definition(self) -> &'static TransitionDefinition {
        &TRANSITIONS[self as usize]
    }

    /// The camelCase identifier used in documents and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionType::None => "none",
            TransitionType::Fade => "fade",
            TransitionType::Crossfade => "crossfade",
            TransitionType::SlideLeft => "slideLeft",
            TransitionType::SlideRight => "slideRight",
            TransitionType::SlideUp => "slideUp",
            TransitionType::SlideDown => "slideDown",
            TransitionType::ZoomIn => "zoomIn",
            TransitionType::ZoomOut => "zoomOut",
            TransitionType::WipeLeft => "wipeLeft",
            TransitionType::WipeRight => "wipeRight",
            TransitionType::WipeUp => "wipeUp",
            TransitionType::WipeDown => "wipeDown",
            TransitionType::Blur => "blur",
            TransitionType::Pixelize => "pixelize",
            TransitionType::Rotate => "rotate",
            TransitionType::Flip => "flip",
            TransitionType::Glitch => "glitch",
            TransitionType::Flash => "flash",
            TransitionType::Shake => "shake",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        TRANSITIONS
            .iter()
            .map(|d| d.kind)
            .find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_valid_transition_type(value: &str) -> bool {
    TransitionType::parse(value).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(rename = "type")]
    pub kind: TransitionType,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub easing: Easing,
}

impl Default for Transition {
    fn default() -> Self {
        Self::none()
    }
}

impl Transition {
    pub fn none() -> Self {
        Self {
            kind: TransitionType::None,
            duration: 0.0,
            easing: Easing::EaseInOut,
        }
    }

    /// Build a transition with its duration clamped into the catalog bounds.
    pub fn new(kind: TransitionType, duration: Option<f64>, easing: Option<Easing>) -> Self {
        let def = kind.definition();
        let duration = duration
            .unwrap_or(def.default_duration)
            .clamp(def.min_duration, def.max_duration);
        Self {
            kind,
            duration,
            easing: easing.unwrap_or_default(),
        }
    }

    /// Re-apply catalog bounds to a transition that did not come from [`Transition::new`].
    ///
    /// A missing (zero) duration takes the type's default.
    pub fn normalized(self) -> Self {
        Self::new(
            self.kind,
            Some(self.duration).filter(|d| *d > 0.0),
            Some(self.easing),
        )
    }

    /// True when this transition is a hard cut.
    pub fn is_cut(&self) -> bool {
        !self.kind.definition().uses_xfade() || self.duration <= 0.0
    }
}

pub fn transitions_by_category(category: TransitionCategory) -> Vec<&'static TransitionDefinition> {
    TRANSITIONS
        .iter()
        .filter(|d| d.category == category)
        .collect()
}

/// Filters for [`random_transition`].
#[derive(Debug, Clone, Default)]
pub struct RandomTransitionOptions {
    pub categories: Vec<TransitionCategory>,
    pub exclude: Vec<TransitionType>,
    pub duration: Option<f64>,
}

/// Pick a random non-cut transition, or `None` if the filters exclude everything.
pub fn random_transition(options: &RandomTransitionOptions) -> Option<Transition> {
    let available: Vec<&TransitionDefinition> = TRANSITIONS
        .iter()
        .filter(|d| d.kind != TransitionType::None)
        .filter(|d| options.categories.is_empty() || options.categories.contains(&d.category))
        .filter(|d| !options.exclude.contains(&d.kind))
        .collect();

    let picked = available.choose(&mut rand::thread_rng())?;
    Some(Transition::new(picked.kind, options.duration, None))
}

/// Transitions that read well in short vertical videos.
pub fn short_form_transitions() -> Vec<Transition> {
    vec![
        crate::presets::TransitionPreset::QuickFade.transition(),
        crate::presets::TransitionPreset::Flash.transition(),
        crate::presets::TransitionPreset::Glitch.transition(),
        Transition::new(TransitionType::SlideUp, Some(0.3), None),
        Transition::new(TransitionType::ZoomIn, Some(0.3), None),
    ]
}

/// Easing curve as an ffmpeg expression over the progress variable.
///
/// Compound progress expressions are parenthesised before being reused.
pub fn easing_expr(easing: Easing, progress: &str) -> String {
    if easing == Easing::Linear {
        return progress.to_string();
    }
    let p = if progress.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        progress.to_string()
    } else {
        format!("({progress})")
    };
    let p = p.as_str();
    match easing {
        Easing::Linear => p.to_string(),
        Easing::EaseIn => format!("{p}*{p}"),
        Easing::EaseOut => format!("1-(1-{p})*(1-{p})"),
        Easing::EaseInOut => format!("if(lt({p},0.5),2*{p}*{p},1-pow(-2*{p}+2,2)/2)"),
    }
}

/// Total time removed from the output by overlapping clips.
pub fn calculate_transition_overlap(transitions: &[Transition]) -> f64 {
    transitions
        .iter()
        .filter(|t| !t.is_cut())
        .map(|t| t.duration)
        .sum()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionValidation {
    pub valid: bool,
    pub max_duration: f64,
    pub message: Option<String>,
}

pub fn validate_transition_duration(
    transition: &Transition,
    left_duration: f64,
    right_duration: f64,
) -> TransitionValidation {
    let max_allowed = left_duration.min(right_duration) * 0.5;

    if transition.duration > max_allowed {
        return TransitionValidation {
            valid: false,
            max_duration: max_allowed,
            message: Some(format!(
                "Transition duration ({}s) exceeds maximum allowed ({:.2}s) based on clip durations",
                transition.duration, max_allowed
            )),
        };
    }

    TransitionValidation {
        valid: true,
        max_duration: max_allowed,
        message: None,
    }
}

/// Shorten transitions that exceed half of either neighbouring clip.
///
/// Offending transitions are rewritten to 80% of the allowed maximum.
/// Missing clip durations count as zero, which turns the transition into a cut.
pub fn auto_adjust_transitions(clip_durations: &[f64], transitions: &[Transition]) -> Vec<Transition> {
    transitions
        .iter()
        .enumerate()
        .map(|(i, transition)| {
            let left = clip_durations.get(i).copied().unwrap_or(0.0).max(0.0);
            let right = clip_durations.get(i + 1).copied().unwrap_or(0.0).max(0.0);
            let validation = validate_transition_duration(transition, left, right);
            if validation.valid {
                *transition
            } else {
                Transition {
                    duration: validation.max_duration * 0.8,
                    ..*transition
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_matches_enum() {
        for (index, def) in TRANSITIONS.iter().enumerate() {
            assert_eq!(def.kind as usize, index, "{} out of order", def.name);
            assert_eq!(def.kind.definition().kind, def.kind);
            assert_eq!(TransitionType::parse(def.kind.as_str()), Some(def.kind));
        }
        assert!(!TransitionType::None.definition().uses_xfade());
        assert_eq!(TransitionType::Crossfade.definition().xfade, Some("dissolve"));
        assert_eq!(TransitionType::ZoomIn.definition().xfade, Some("smoothup"));
    }

    #[test]
    fn normalized_fills_defaults_and_clamps() {
        let raw: Transition = toml::from_str("type = \"fade\"").unwrap();
        assert_eq!(raw.duration, 0.0);
        let fade = raw.normalized();
        assert_eq!(fade.duration, TransitionType::Fade.definition().default_duration);

        let long = Transition {
            kind: TransitionType::Fade,
            duration: 5.0,
            easing: Easing::Linear,
        }
        .normalized();
        assert_eq!(long.duration, TransitionType::Fade.definition().max_duration);
        assert_eq!(long.easing, Easing::Linear);

        assert!(Transition::none().normalized().is_cut());
    }

    #[test]
    fn new_clamps_into_catalog_bounds() {
        let t = Transition::new(TransitionType::Glitch, Some(5.0), None);
        assert_eq!(t.duration, 0.5);
        assert_eq!(t.easing, Easing::EaseInOut);

        let t = Transition::new(TransitionType::Fade, Some(0.01), Some(Easing::Linear));
        assert_eq!(t.duration, 0.1);
        assert_eq!(t.easing, Easing::Linear);

        let t = Transition::new(TransitionType::None, Some(1.0), None);
        assert_eq!(t.duration, 0.0);
        assert!(t.is_cut());
    }

    #[test]
    fn auto_adjust_shrinks_over_long_transitions() {
        let transitions = vec![Transition::new(TransitionType::Fade, Some(2.0), None)];
        let adjusted = auto_adjust_transitions(&[2.0, 3.0], &transitions);
        assert!((adjusted[0].duration - 0.8).abs() < 1e-9);

        let fine = vec![Transition::new(TransitionType::Fade, Some(0.5), None)];
        assert_eq!(auto_adjust_transitions(&[3.0, 3.0], &fine), fine);
    }

    #[test]
    fn auto_adjust_never_exceeds_half_the_shorter_clip() {
        let durations = [0.05, 0.3, 1.0, 2.5, 7.0, 60.0];
        for requested in [0.0, 0.1, 0.5, 3.0, 1e6, f64::MAX] {
            for &a in &durations {
                for &b in &durations {
                    let t = Transition {
                        kind: TransitionType::Crossfade,
                        duration: requested,
                        easing: Easing::Linear,
                    };
                    let adjusted = auto_adjust_transitions(&[a, b], &[t]);
                    assert!(adjusted[0].duration <= 0.5 * a.min(b) + 1e-12);
                }
            }
        }
    }

    #[test]
    fn easing_expressions() {
        assert_eq!(easing_expr(Easing::Linear, "P"), "P");
        assert_eq!(easing_expr(Easing::EaseIn, "P"), "P*P");
        assert_eq!(easing_expr(Easing::EaseIn, "(t-1)/2"), "((t-1)/2)*((t-1)/2)");
        assert_eq!(easing_expr(Easing::Linear, "(t-1)/2"), "(t-1)/2");
        assert_eq!(easing_expr(Easing::EaseOut, "P"), "1-(1-P)*(1-P)");
        assert_eq!(
            easing_expr(Easing::EaseInOut, "P"),
            "if(lt(P,0.5),2*P*P,1-pow(-2*P+2,2)/2)"
        );
    }

    #[test]
    fn random_transition_respects_filters() {
        let options = RandomTransitionOptions {
            categories: vec![TransitionCategory::Zoom],
            exclude: vec![TransitionType::ZoomIn],
            duration: Some(0.3),
        };
        let t = random_transition(&options).unwrap();
        assert_eq!(t.kind, TransitionType::ZoomOut);
        assert_eq!(t.duration, 0.3);

        let none = RandomTransitionOptions {
            categories: vec![TransitionCategory::Zoom],
            exclude: vec![TransitionType::ZoomIn, TransitionType::ZoomOut],
            duration: None,
        };
        assert!(random_transition(&none).is_none());
    }

    #[test]
    fn category_lookup() {
        let wipes = transitions_by_category(TransitionCategory::Wipe);
        assert_eq!(wipes.len(), 4);
        assert_eq!(TransitionCategory::parse("shortform"), Some(TransitionCategory::Shortform));
        assert!(is_valid_transition_type("slideLeft"));
        assert!(!is_valid_transition_type("slide_left"));
    }

    #[test]
    fn serde_uses_camel_case_type_tag() {
        let t: Transition = serde_json::from_str(r#"{"type":"slideLeft","duration":0.4}"#).unwrap();
        assert_eq!(t.kind, TransitionType::SlideLeft);
        assert_eq!(t.easing, Easing::EaseInOut);
    }
}
