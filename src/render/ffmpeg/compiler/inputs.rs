use std::path::PathBuf;

use crate::render::pipeline::PipelineConfig;

/// Input files in `-i` order: every clip, then every audio track.
///
/// Sources are never deduplicated; each clip reads its own input so that
/// per-clip trims stay independent.
#[derive(Debug, Clone)]
pub struct InputPlan {
    sources: Vec<PathBuf>,
    clip_count: usize,
}

impl InputPlan {
    pub fn build(config: &PipelineConfig) -> Self {
        let mut sources: Vec<PathBuf> = config.clips.iter().map(|c| c.source.clone()).collect();
        sources.extend(config.audio_tracks.iter().map(|t| t.source.clone()));
        Self {
            sources,
            clip_count: config.clips.len(),
        }
    }

    pub fn from_clip_sources(sources: Vec<PathBuf>) -> Self {
        let clip_count = sources.len();
        Self {
            sources,
            clip_count,
        }
    }

    pub fn clip_input(&self, index: usize) -> usize {
        index
    }

    /// Audio tracks are numbered after the clips.
    pub fn track_input(&self, index: usize) -> usize {
        self.clip_count + index
    }

    pub fn input_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.sources.len() * 2);
        for source in &self.sources {
            args.push("-i".to_string());
            args.push(source.to_string_lossy().into_owned());
        }
        args
    }
}
