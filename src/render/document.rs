use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::audio::AudioTrack;
use crate::clip::Clip;
use crate::config::{EditorConfig, expand_path};
use crate::presets::{AspectRatio, Platform, Quality, Resolution, SubtitlePreset, VideoFormat};
use crate::render::logging::log_event;
use crate::render::pipeline::PipelineBuilder;
use crate::subtitles::{
    SubtitleConfig, SubtitleEntry, SubtitleFormat, SubtitleStyleOverrides, create_subtitle_config,
};
use crate::text::TextLayer;
use crate::transitions::Transition;
use crate::ui::prelude::Level;

/// An edit as written by hand: TOML, JSON or YAML.
///
/// Relative paths are resolved against the document's directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditDocument {
    pub clips: Vec<Clip>,
    /// Applied to every pair before `transitions`.
    pub transition: Option<Transition>,
    /// Per pair, in clip order.
    pub transitions: Vec<Transition>,
    /// Shorthand for a background music track using the configured volume and fades.
    pub music: Option<PathBuf>,
    pub audio_tracks: Vec<AudioTrack>,
    pub duck_music: bool,
    pub subtitles: Option<SubtitleSource>,
    pub text_layers: Vec<TextLayer>,
    pub output: DocumentOutput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleSource {
    /// SRT or WebVTT file; takes precedence over inline entries.
    pub file: Option<PathBuf>,
    pub entries: Vec<SubtitleEntry>,
    pub preset: Option<SubtitlePreset>,
    pub style: SubtitleStyleOverrides,
    pub word_by_word: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOutput {
    pub path: Option<PathBuf>,
    pub platform: Option<Platform>,
    pub format: Option<VideoFormat>,
    pub aspect_ratio: Option<AspectRatio>,
    pub resolution: Option<Resolution>,
    pub fps: Option<u32>,
    pub quality: Option<Quality>,
    pub video_bitrate: Option<String>,
    pub audio_bitrate: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Toml,
    Json,
    Yaml,
}

impl DocumentFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => bail!(
                "Unsupported edit document {}: expected .toml, .json or .yaml",
                path.display()
            ),
        }
    }
}

pub fn parse_edit_document(contents: &str, path: &Path) -> Result<EditDocument> {
    let document = match DocumentFormat::from_path(path)? {
        DocumentFormat::Toml => toml::from_str(contents)
            .with_context(|| format!("Failed to parse TOML edit {}", path.display()))?,
        DocumentFormat::Json => serde_json::from_str(contents)
            .with_context(|| format!("Failed to parse JSON edit {}", path.display()))?,
        DocumentFormat::Yaml => serde_yaml::from_str(contents)
            .with_context(|| format!("Failed to parse YAML edit {}", path.display()))?,
    };
    Ok(document)
}

pub(crate) fn load_edit_document(path: &Path) -> Result<EditDocument> {
    log_event(
        Level::Debug,
        "render.document.read",
        format!("Reading edit from {}", path.display()),
    );

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read edit document {}", path.display()))?;
    parse_edit_document(&contents, path)
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    let expanded = expand_path(&path.to_string_lossy());
    if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}

impl EditDocument {
    /// Turn the document into a builder, with `config` supplying every default
    /// the document leaves out. `output_override` wins over `output.path`.
    pub fn into_builder(
        self,
        base_dir: &Path,
        config: &EditorConfig,
        output_override: Option<PathBuf>,
    ) -> Result<PipelineBuilder> {
        let mut builder = PipelineBuilder::new()
            .default_transition(config.default_transition())
            .set_quality(config.quality)
            .set_fps(config.fps)
            .duck_music(self.duck_music);

        builder = builder.add_clips(self.clips.into_iter().map(|clip| Clip {
            source: resolve(base_dir, &clip.source),
            ..clip
        }));

        if let Some(transition) = self.transition {
            builder = builder.set_all_transitions(transition);
        }
        for (index, transition) in self.transitions.into_iter().enumerate() {
            builder = builder.set_transition(index, transition);
        }

        if let Some(music) = self.music {
            builder = builder.add_audio_track(
                AudioTrack::background_music(resolve(base_dir, &music))
                    .with_volume(config.music_volume)
                    .with_fades(config.audio_fade, config.audio_fade),
            );
        }
        for track in self.audio_tracks {
            builder = builder.add_audio_track(AudioTrack {
                source: resolve(base_dir, &track.source),
                ..track
            });
        }

        if let Some(source) = self.subtitles {
            builder = builder.set_subtitles(source.into_config(base_dir, config)?);
        }
        for layer in self.text_layers {
            builder = builder.add_text_layer(layer);
        }

        let output = self.output;
        let path = output_override
            .or_else(|| output.path.as_deref().map(|p| resolve(base_dir, p)))
            .unwrap_or_default();
        builder = match (output.platform, output.format) {
            (Some(platform), format) => {
                let builder = builder.set_output_for_platform(path.clone(), platform);
                match format {
                    Some(format) => builder.set_output(path, Some(format)),
                    None => builder,
                }
            }
            (None, format) => builder.set_output(path, format),
        };
        if let Some(aspect_ratio) = output.aspect_ratio {
            builder = builder.set_aspect_ratio(aspect_ratio);
        }
        if let Some(resolution) = output.resolution {
            builder = builder.set_resolution(resolution);
        }
        if let Some(fps) = output.fps.filter(|fps| *fps > 0) {
            builder = builder.set_fps(fps);
        }
        if let Some(quality) = output.quality {
            builder = builder.set_quality(quality);
        }
        if let Some(bitrate) = output.video_bitrate {
            builder = builder.set_video_bitrate(bitrate);
        }
        if let Some(bitrate) = output.audio_bitrate {
            builder = builder.set_audio_bitrate(bitrate);
        }

        Ok(builder)
    }
}

impl SubtitleSource {
    fn into_config(self, base_dir: &Path, config: &EditorConfig) -> Result<SubtitleConfig> {
        let entries = match &self.file {
            Some(file) => {
                let path = resolve(base_dir, file);
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read subtitles {}", path.display()))?;
                let format = SubtitleFormat::from_path(&path)
                    .unwrap_or_else(|_| SubtitleFormat::detect(&contents));
                format.parse(&contents)?
            }
            None => self.entries,
        };

        Ok(create_subtitle_config(
            entries,
            Some(self.preset.unwrap_or(config.subtitle_preset)),
            Some(&self.style),
            self.word_by_word,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioRole;
    use crate::presets::VideoDimensions;
    use crate::render::pipeline::PipelineConfig;
    use crate::text::FontResolver;
    use crate::transitions::TransitionType;
    use tempfile::TempDir;

    const TOML_EDIT: &str = r#"
music = "bed.mp3"
duck_music = true

[transition]
type = "crossfade"
duration = 0.5

[[clips]]
source = "a.mp4"
start_time = 1.0
end_time = 4.0

[[clips]]
source = "/abs/b.mp4"
duration = 3.0

[output]
path = "out/final.mp4"
platform = "youtube"
"#;

    #[test]
    fn toml_documents_resolve_against_their_directory() {
        let doc = parse_edit_document(TOML_EDIT, Path::new("edit.toml")).unwrap();
        let config = EditorConfig::default();
        let pipeline = doc
            .into_builder(Path::new("/project"), &config, None)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(pipeline.clips[0].source, PathBuf::from("/project/a.mp4"));
        assert_eq!(pipeline.clips[1].source, PathBuf::from("/abs/b.mp4"));
        assert_eq!(pipeline.output.path, PathBuf::from("/project/out/final.mp4"));
        assert_eq!(pipeline.output.dimensions(), VideoDimensions::new(1920, 1080));
        assert_eq!(pipeline.transitions[0].kind, TransitionType::Crossfade);
        assert!(pipeline.duck_music);

        let music = &pipeline.audio_tracks[0];
        assert_eq!(music.role, AudioRole::Music);
        assert_eq!(music.volume, config.music_volume);
        assert_eq!(music.fade_in, config.audio_fade);
    }

    fn two_long_clips(transition: &str) -> PipelineConfig {
        let toml = format!(
            "{transition}\n[[clips]]\nsource = \"a.mp4\"\nduration = 20.0\n[[clips]]\nsource = \"b.mp4\"\nduration = 20.0\n[output]\npath = \"o.mp4\"\n"
        );
        parse_edit_document(&toml, Path::new("edit.toml"))
            .unwrap()
            .into_builder(Path::new("."), &EditorConfig::default(), None)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn document_transitions_are_clamped_to_the_catalog() {
        let fade = TransitionType::Fade.definition();

        let pipeline = two_long_clips("[transition]\ntype = \"fade\"\nduration = 5.0");
        assert_eq!(pipeline.transitions[0].duration, fade.max_duration);
        let args = pipeline.compile(&FontResolver::offline()).unwrap().args.join(" ");
        assert!(args.contains("xfade=transition=fade:duration=2:offset=18"));

        let pipeline = two_long_clips("[transition]\ntype = \"fade\"");
        assert_eq!(pipeline.transitions[0].duration, fade.default_duration);
        assert!((pipeline.total_duration() - (40.0 - fade.default_duration)).abs() < 1e-9);
        let args = pipeline.compile(&FontResolver::offline()).unwrap().args.join(" ");
        assert!(args.contains("xfade=transition=fade"));
    }

    #[test]
    fn json_and_yaml_are_accepted() {
        let json = r#"{"clips": [{"source": "a.mp4", "duration": 2.0}], "output": {"path": "o.webm"}}"#;
        let doc = parse_edit_document(json, Path::new("edit.json")).unwrap();
        assert_eq!(doc.clips.len(), 1);

        let yaml = "clips:\n  - source: a.mp4\n    duration: 2.0\noutput:\n  path: o.mp4\n  quality: draft\n";
        let doc = parse_edit_document(yaml, Path::new("edit.YML")).unwrap();
        assert_eq!(doc.output.quality, Some(Quality::Draft));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = parse_edit_document("", Path::new("edit.txt")).unwrap_err();
        assert!(err.to_string().contains("Unsupported edit document"));
    }

    #[test]
    fn override_path_and_config_defaults() {
        let doc = parse_edit_document(
            "[[clips]]\nsource = \"a.mp4\"\nduration = 2.0\n[[clips]]\nsource = \"b.mp4\"\nduration = 2.0\n",
            Path::new("edit.toml"),
        )
        .unwrap();
        let config = EditorConfig {
            default_transition: TransitionType::None,
            quality: Quality::Best,
            ..EditorConfig::default()
        };
        let pipeline = doc
            .into_builder(Path::new("."), &config, Some(PathBuf::from("cli.mp4")))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(pipeline.output.path, PathBuf::from("cli.mp4"));
        assert_eq!(pipeline.output.quality, Quality::Best);
        assert_eq!(pipeline.transitions, vec![Transition::none()]);
    }

    #[test]
    fn subtitle_files_are_read_and_styled() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("captions.vtt"),
            "WEBVTT\n\n00:00:00.000 --> 00:00:01.500\nHello\n",
        )
        .unwrap();
        let source = SubtitleSource {
            file: Some("captions.vtt".into()),
            preset: Some(SubtitlePreset::Classic),
            ..SubtitleSource::default()
        };
        let subtitles = source
            .into_config(dir.path(), &EditorConfig::default())
            .unwrap();
        assert_eq!(subtitles.entries.len(), 1);
        assert_eq!(subtitles.entries[0].text, "Hello");
        assert_eq!(subtitles.style, SubtitlePreset::Classic.style());
    }
}
