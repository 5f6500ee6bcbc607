use std::path::PathBuf;

use bmpsteg_carrier::CarrierError;
use bmpsteg_frame::FrameError;

use crate::stage::Stage;

/// Errors that can occur in encode and decode sessions.
#[derive(Debug, thiserror::Error)]
pub enum StegError {
    /// A file could not be opened or created.
    #[error("cannot open {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on an already open stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Carrier-level error.
    #[error("carrier error: {0}")]
    Carrier(#[from] CarrierError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The payload file has no bytes to hide.
    #[error("payload contains no data")]
    EmptyPayload,

    /// The carrier cannot hold the frame.
    #[error("carrier too small: needs {required} bytes, has {available}")]
    CapacityExceeded { required: u64, available: u64 },

    /// The payload file name has no extension to record.
    #[error("no file extension in {0:?}")]
    NoExtension(String),

    /// The payload extension does not fit the extension field.
    #[error("file extension too long (max {max} characters)")]
    ExtensionTooLong { max: usize },

    /// The carrier does not start with the magic marker.
    #[error("carrier contains no hidden data")]
    NoHiddenData,

    /// Malformed arguments or frame contents.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An error raised inside a named pipeline stage.
    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<StegError>,
    },
}

/// Coarse classification of a [`StegError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileError,
    EmptyPayload,
    CapacityExceeded,
    NoExtension,
    ExtensionTooLong,
    NoHiddenData,
    Truncated,
    InvalidInput,
}

impl StegError {
    /// Classify this error, looking through stage wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StegError::File { .. } | StegError::Io(_) => ErrorKind::FileError,
            StegError::Carrier(CarrierError::Io(_)) => ErrorKind::FileError,
            StegError::Carrier(_) => ErrorKind::InvalidInput,
            StegError::Frame(FrameError::Io(_)) => ErrorKind::FileError,
            StegError::Frame(FrameError::Truncated { .. }) => ErrorKind::Truncated,
            StegError::Frame(_) => ErrorKind::InvalidInput,
            StegError::EmptyPayload => ErrorKind::EmptyPayload,
            StegError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            StegError::NoExtension(_) => ErrorKind::NoExtension,
            StegError::ExtensionTooLong { .. } => ErrorKind::ExtensionTooLong,
            StegError::NoHiddenData => ErrorKind::NoHiddenData,
            StegError::InvalidInput(_) => ErrorKind::InvalidInput,
            StegError::Stage { source, .. } => source.kind(),
        }
    }

    /// The stage this error was raised in, if it was tagged with one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            StegError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The innermost error, with stage wrappers removed.
    pub fn root(&self) -> &StegError {
        match self {
            StegError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// The underlying I/O error, if this error came from one.
    pub fn io_source(&self) -> Option<&std::io::Error> {
        match self.root() {
            StegError::File { source, .. } | StegError::Io(source) => Some(source),
            StegError::Carrier(CarrierError::Io(source)) => Some(source),
            StegError::Frame(FrameError::Io(source)) => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StegError>;

/// Tag a fallible step with the pipeline stage it belongs to.
pub(crate) trait StageExt<T> {
    fn at(self, stage: Stage) -> Result<T>;
}

impl<T, E: Into<StegError>> StageExt<T> for std::result::Result<T, E> {
    fn at(self, stage: Stage) -> Result<T> {
        self.map_err(|err| match err.into() {
            tagged @ StegError::Stage { .. } => tagged,
            err => StegError::Stage {
                stage,
                source: Box::new(err),
            },
        })
    }
}
