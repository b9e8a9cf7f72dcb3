use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::render::pipeline::PipelineConfig;

/// Make sure the render can write its output before anything is spawned.
pub(crate) fn prepare_output_destination(config: &PipelineConfig) -> Result<()> {
    let output_path = config.output.path.as_path();

    let overwrites_input = config
        .clips
        .iter()
        .map(|c| c.source.as_path())
        .chain(config.audio_tracks.iter().map(|t| t.source.as_path()))
        .any(|source| source == output_path);
    if overwrites_input {
        bail!(
            "Output path {} would overwrite one of the inputs",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    Ok(())
}

/// Size of the finished output in bytes.
pub(crate) async fn output_file_size(path: &Path) -> Result<u64> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read output file {}", path.display()))?;
    Ok(metadata.len())
}
