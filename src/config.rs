use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::presets::{Quality, SubtitlePreset, defaults};
use crate::text::FontResolver;
use crate::transitions::{Transition, TransitionType};

/// User defaults applied to every edit document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Processor binary; looked up on `PATH` when unset
    pub ffmpeg_path: Option<String>,
    /// Directory searched for `fontfile=` paths
    pub fonts_dir: Option<String>,
    pub default_transition: TransitionType,
    /// Seconds; the catalog default for the transition when unset
    pub default_transition_duration: Option<f64>,
    pub music_volume: f64,
    /// Fade in/out applied to music added through `music =`
    pub audio_fade: f64,
    pub subtitle_preset: SubtitlePreset,
    pub quality: Quality,
    pub fps: u32,
    pub render_timeout_secs: Option<u64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let transition = defaults::TRANSITION.transition();
        Self {
            ffmpeg_path: None,
            fonts_dir: None,
            default_transition: transition.kind,
            default_transition_duration: Some(transition.duration),
            music_volume: defaults::MUSIC_VOLUME,
            audio_fade: defaults::AUDIO_FADE_DURATION,
            subtitle_preset: defaults::SUBTITLE_STYLE,
            quality: defaults::QUALITY,
            fps: defaults::FPS,
            render_timeout_secs: None,
        }
    }
}

impl EditorConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_path(config_path()?)
    }

    /// Read the config, writing the defaults first if the file is missing.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save_to_path(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading editor config from {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing editor config {}", path.display()))?;
        Ok(config.sanitized())
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }

        let toml = toml::to_string_pretty(self).context("serializing editor config")?;
        fs::write(path, toml)
            .with_context(|| format!("writing editor config to {}", path.display()))?;
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        let fallback = Self::default();
        if !self.music_volume.is_finite() || !(0.0..=2.0).contains(&self.music_volume) {
            self.music_volume = fallback.music_volume;
        }
        if !self.audio_fade.is_finite() || self.audio_fade < 0.0 {
            self.audio_fade = fallback.audio_fade;
        }
        if self.fps == 0 {
            self.fps = fallback.fps;
        }
        if let Some(duration) = self.default_transition_duration
            && (!duration.is_finite() || duration < 0.0)
        {
            self.default_transition_duration = None;
        }
        if self.render_timeout_secs == Some(0) {
            self.render_timeout_secs = None;
        }
        self
    }

    pub fn default_transition(&self) -> Transition {
        if self.default_transition == TransitionType::None {
            return Transition::none();
        }
        Transition::new(self.default_transition, self.default_transition_duration, None)
    }

    pub fn ffmpeg_path(&self) -> Option<PathBuf> {
        self.ffmpeg_path.as_deref().map(expand_path)
    }

    pub fn fonts_dir(&self) -> Option<PathBuf> {
        self.fonts_dir.as_deref().map(expand_path)
    }

    /// Resolver backed by the system font list and the configured directory.
    pub fn font_resolver(&self) -> FontResolver {
        let resolver = FontResolver::system();
        match self.fonts_dir() {
            Some(dir) => resolver.with_fonts_dir(dir),
            None => resolver,
        }
    }
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Unable to determine config directory")?;
    Ok(base.join("reelkit").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn first_load_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reelkit").join("config.toml");
        let config = EditorConfig::load_from_path(&path).unwrap();
        assert_eq!(config, EditorConfig::default());
        assert!(path.exists());

        let reloaded = EditorConfig::load_from_path(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn out_of_range_values_fall_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "music_volume = 7.5\nfps = 0\naudio_fade = -1.0\nrender_timeout_secs = 0\n",
        )
        .unwrap();
        let config = EditorConfig::load_from_path(&path).unwrap();
        assert_eq!(config.music_volume, defaults::MUSIC_VOLUME);
        assert_eq!(config.fps, defaults::FPS);
        assert_eq!(config.audio_fade, defaults::AUDIO_FADE_DURATION);
        assert_eq!(config.render_timeout_secs, None);
    }

    #[test]
    fn partial_files_keep_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_transition = \"flash\"\nquality = \"draft\"\n").unwrap();
        let config = EditorConfig::load_from_path(&path).unwrap();
        assert_eq!(config.quality, Quality::Draft);
        assert_eq!(config.subtitle_preset, SubtitlePreset::Tiktok);
        assert_eq!(config.default_transition().kind, TransitionType::Flash);
    }

    #[test]
    fn none_transition_is_a_cut() {
        let config = EditorConfig {
            default_transition: TransitionType::None,
            ..EditorConfig::default()
        };
        assert_eq!(config.default_transition(), Transition::none());
    }

    #[test]
    fn tilde_paths_are_expanded() {
        let config = EditorConfig {
            fonts_dir: Some("~/fonts".into()),
            ..EditorConfig::default()
        };
        let dir = config.fonts_dir().unwrap();
        assert!(!dir.to_string_lossy().starts_with('~'));
        assert!(dir.ends_with("fonts"));
    }
}
