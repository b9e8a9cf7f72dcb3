use thiserror::Error;

/// Errors raised while building or editing a pipeline description.
///
/// Execution failures are not represented here; a failed render is reported
/// through [`crate::render::EditResult`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("pipeline has no clips")]
    NoClips,

    #[error("output path is missing")]
    MissingOutputPath,

    #[error("index {index} is out of range for {len} clips")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("split time {time} is outside clip range ({start} - {end})")]
    SplitOutOfRange { time: f64, start: f64, end: f64 },

    #[error("new order has {got} entries but there are {expected} clips")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Invalid clips: {}", .0.join("; "))]
    InvalidClips(Vec<String>),

    #[error("filter label [{0}] is written more than once")]
    DuplicateLabel(String),

    #[error("unsupported subtitle format: {0}")]
    UnknownSubtitleFormat(String),
}
