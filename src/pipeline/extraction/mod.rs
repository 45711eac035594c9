pub mod types;
pub mod format;
pub mod sanitize;
pub mod classify;
pub mod identity;
pub mod vitals;
pub mod confidence;
pub mod orchestrator;
pub mod scripted;

pub use types::*;
pub use format::*;
pub use sanitize::*;
pub use classify::*;
pub use confidence::*;
pub use orchestrator::*;
pub use scripted::*;

use thiserror::Error;

use crate::models::RecordError;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format for extraction: '{name}' ({detected})")]
    UnsupportedFormat { name: String, detected: String },

    #[error("Artifact is empty")]
    EmptyArtifact,

    #[error("No document reader configured for {0} input")]
    ReaderUnavailable(&'static str),

    #[error("Document reader failed: {0}")]
    Reader(String),

    #[error("Text encoding error: {0}")]
    EncodingError(String),

    #[error("Invalid extracted record: {0}")]
    Record(#[from] RecordError),
}
