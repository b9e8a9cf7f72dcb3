//! Font catalog and resolution of family names to something drawtext can load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use duct::cmd;
use serde::Serialize;

use super::FontWeight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontCategory {
    SansSerif,
    Serif,
    Display,
    Handwriting,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontUse {
    Titles,
    Subtitles,
    Captions,
    Hooks,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FontMetadata {
    pub family: &'static str,
    pub category: FontCategory,
    pub weights: &'static [FontWeight],
    pub recommended_for: &'static [FontUse],
}

use FontCategory::{Display, Handwriting, SansSerif};
use FontUse::{Captions, Hooks, Subtitles, Titles};
use FontWeight::*;

const ALL_WEIGHTS: &[FontWeight] = &[
    Thin, ExtraLight, Light, Regular, Medium, SemiBold, Bold, ExtraBold, Black,
];
const REGULAR_ONLY: &[FontWeight] = &[Regular];
const TITLE_HOOK: &[FontUse] = &[Titles, Hooks];
const SUBS_CAPTIONS: &[FontUse] = &[Subtitles, Captions];

const fn font(
    family: &'static str,
    category: FontCategory,
    weights: &'static [FontWeight],
    recommended_for: &'static [FontUse],
) -> FontMetadata {
    FontMetadata {
        family,
        category,
        weights,
        recommended_for,
    }
}

pub const FONTS: &[FontMetadata] = &[
    font("Montserrat", SansSerif, ALL_WEIGHTS, &[Titles, Subtitles, Captions]),
    font("Roboto", SansSerif, &[Thin, Light, Regular, Medium, Bold, Black], SUBS_CAPTIONS),
    font("Poppins", SansSerif, ALL_WEIGHTS, &[Titles, Subtitles, Captions, Hooks]),
    font("Inter", SansSerif, ALL_WEIGHTS, SUBS_CAPTIONS),
    font("Open Sans", SansSerif, &[Light, Regular, Medium, SemiBold, Bold, ExtraBold], SUBS_CAPTIONS),
    font("Oswald", SansSerif, &[ExtraLight, Light, Regular, Medium, SemiBold, Bold], TITLE_HOOK),
    font("Bebas Neue", Display, REGULAR_ONLY, TITLE_HOOK),
    font("Anton", Display, REGULAR_ONLY, TITLE_HOOK),
    font("Impact", Display, REGULAR_ONLY, TITLE_HOOK),
    font("Archivo Black", Display, REGULAR_ONLY, TITLE_HOOK),
    font("Black Ops One", Display, REGULAR_ONLY, TITLE_HOOK),
    font("Russo One", Display, REGULAR_ONLY, TITLE_HOOK),
    font("Bangers", Display, REGULAR_ONLY, TITLE_HOOK),
    font("Permanent Marker", Handwriting, REGULAR_ONLY, TITLE_HOOK),
    font("Pacifico", Handwriting, REGULAR_ONLY, &[Titles]),
    font("Lobster", Handwriting, REGULAR_ONLY, &[Titles]),
    font("Fredoka One", Display, REGULAR_ONLY, TITLE_HOOK),
    font("Luckiest Guy", Display, REGULAR_ONLY, TITLE_HOOK),
    font("Arial", SansSerif, &[Regular, Bold], SUBS_CAPTIONS),
    font("Arial Black", SansSerif, REGULAR_ONLY, TITLE_HOOK),
    font("Helvetica", SansSerif, &[Light, Regular, Bold], SUBS_CAPTIONS),
    font("Verdana", SansSerif, &[Regular, Bold], SUBS_CAPTIONS),
];

pub fn fonts_by_category(category: FontCategory) -> Vec<&'static FontMetadata> {
    FONTS.iter().filter(|f| f.category == category).collect()
}

pub fn fonts_for_use(usage: FontUse) -> Vec<&'static FontMetadata> {
    FONTS
        .iter()
        .filter(|f| f.recommended_for.contains(&usage))
        .collect()
}

const FALLBACK_FAMILIES: [&str; 2] = ["Arial", "Helvetica"];
const GENERIC_FAMILY: &str = "sans-serif";

/// Resolves font families against the system font list and a local fonts
/// directory.
///
/// An offline resolver never shells out and treats every family as
/// installed, which keeps compiled filter graphs deterministic.
#[derive(Debug, Default)]
pub struct FontResolver {
    fonts_dir: Option<PathBuf>,
    query_system: bool,
    cache: Mutex<HashMap<String, bool>>,
}

impl FontResolver {
    pub fn offline() -> Self {
        Self::default()
    }

    /// Resolver that asks `fc-list` which families are installed.
    pub fn system() -> Self {
        Self {
            query_system: true,
            ..Self::default()
        }
    }

    pub fn with_fonts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fonts_dir = Some(dir.into());
        self
    }

    pub fn fonts_dir(&self) -> Option<&Path> {
        self.fonts_dir.as_deref()
    }

    pub fn is_available(&self, family: &str) -> bool {
        if !self.query_system {
            return true;
        }
        if let Ok(cache) = self.cache.lock()
            && let Some(&known) = cache.get(family)
        {
            return known;
        }

        let needle = family.to_lowercase();
        let available = cmd!("fc-list", ":", "family")
            .stderr_null()
            .read()
            .map(|output| output.lines().any(|line| line.to_lowercase().contains(&needle)))
            .unwrap_or(false);

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(family.to_string(), available);
        }
        available
    }

    /// `family` if installed, else the first installed fallback, else the
    /// generic `sans-serif`.
    pub fn font_with_fallback(&self, family: &str) -> String {
        if self.is_available(family) {
            return family.to_string();
        }
        FALLBACK_FAMILIES
            .iter()
            .find(|fallback| self.is_available(fallback))
            .map(|fallback| fallback.to_string())
            .unwrap_or_else(|| GENERIC_FAMILY.to_string())
    }

    /// Local `.ttf` for the family and weight inside the fonts directory.
    pub fn font_path(&self, family: &str, weight: FontWeight) -> Option<PathBuf> {
        let dir = self.fonts_dir.as_ref()?;
        font_file_candidates(family, weight)
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }
}

/// File names tried, in order, when looking up a local font.
pub fn font_file_candidates(family: &str, weight: FontWeight) -> Vec<String> {
    let compact: String = family.split_whitespace().collect();
    let dashed = family.split_whitespace().collect::<Vec<_>>().join("-");
    vec![
        format!("{compact}-{}.ttf", weight.as_str()),
        format!("{compact}-{}.ttf", weight.value()),
        format!("{compact}.ttf"),
        format!("{dashed}-{}.ttf", weight.as_str()),
        format!("{dashed}.ttf"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn catalog_filters() {
        assert_eq!(FONTS.len(), 22);
        assert!(fonts_by_category(FontCategory::Handwriting)
            .iter()
            .all(|f| f.category == FontCategory::Handwriting));
        let subtitle_fonts: Vec<&str> = fonts_for_use(FontUse::Subtitles)
            .iter()
            .map(|f| f.family)
            .collect();
        assert!(subtitle_fonts.contains(&"Inter"));
        assert!(!subtitle_fonts.contains(&"Lobster"));
    }

    #[test]
    fn candidates_cover_compact_and_dashed_names() {
        assert_eq!(
            font_file_candidates("Open Sans", FontWeight::SemiBold),
            vec![
                "OpenSans-semibold.ttf",
                "OpenSans-600.ttf",
                "OpenSans.ttf",
                "Open-Sans-semibold.ttf",
                "Open-Sans.ttf",
            ]
        );
    }

    #[test]
    fn font_path_finds_first_existing_candidate() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Open-Sans.ttf"), b"").unwrap();
        std::fs::write(dir.path().join("OpenSans-600.ttf"), b"").unwrap();

        let resolver = FontResolver::offline().with_fonts_dir(dir.path());
        assert_eq!(
            resolver.font_path("Open Sans", FontWeight::SemiBold),
            Some(dir.path().join("OpenSans-600.ttf"))
        );
        assert_eq!(resolver.font_path("Inter", FontWeight::Bold), None);
        assert_eq!(FontResolver::offline().font_path("Open Sans", FontWeight::Bold), None);
    }

    #[test]
    fn offline_resolver_keeps_family() {
        assert_eq!(FontResolver::offline().font_with_fallback("Bangers"), "Bangers");
    }
}
