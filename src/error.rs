/// Error taxonomy shared by all tool pipelines and the selection store.
///
/// Three kinds of failure exist in this application:
/// - `InvalidInput`: the user gave us something unusable (missing file,
///   bad option value). They correct it and try again.
/// - `Collaborator`: a codec, library or external process rejected the
///   work. The message is surfaced verbatim; we never retry.
/// - `IndexOutOfRange`: an internal bug signal from the selection store.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolboxError {
    /// Missing or invalid file/option. The user must correct and retry.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A codec/library/process call failed. Surfaced verbatim, no retry.
    #[error("{0}")]
    Collaborator(String),

    /// A list index was outside bounds. Internal bug signal.
    #[error("index {index} out of range (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

impl ToolboxError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }
}

pub type ToolboxResult<T> = Result<T, ToolboxError>;
