//! Compile declarative short-form video edits into a single ffmpeg
//! filter graph and run it.

pub mod audio;
pub mod cli;
pub mod clip;
pub mod commands;
pub mod concat;
pub mod config;
pub mod doctor;
pub mod error;
pub mod presets;
pub mod render;
pub mod subtitles;
pub mod text;
pub mod transitions;
pub mod ui;

pub use crate::error::EditError;
pub use crate::render::{
    EditDocument, EditResult, PipelineBuilder, PipelineConfig, check_pipeline,
    concatenate_videos, create_short_form_video, execute_pipeline, parse_edit_document,
};
