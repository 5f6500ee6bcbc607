use std::fmt;
use std::io;

use bmpsteg_carrier::CarrierError;
use bmpsteg_session::{ErrorKind, StegError};

// Process exit codes.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const NO_HIDDEN_DATA: i32 = 65;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn io_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound | io::ErrorKind::AlreadyExists => FAILURE,
        io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(&err), format!("{context}: {err}"))
}

pub fn carrier_error(context: &str, err: CarrierError) -> CliError {
    match err {
        CarrierError::Io(source) => io_error(context, source),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

/// Map a session error to an exit code. The message keeps the failed stage.
pub fn steg_error(err: StegError) -> CliError {
    let code = match err.kind() {
        ErrorKind::FileError => err.io_source().map_or(INTERNAL, io_code),
        ErrorKind::NoHiddenData => NO_HIDDEN_DATA,
        ErrorKind::Truncated | ErrorKind::InvalidInput => DATA_INVALID,
        ErrorKind::EmptyPayload
        | ErrorKind::CapacityExceeded
        | ErrorKind::NoExtension
        | ErrorKind::ExtensionTooLong => FAILURE,
    };
    CliError::new(code, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_hidden_data_has_its_own_code() {
        assert_eq!(steg_error(StegError::NoHiddenData).code, NO_HIDDEN_DATA);
    }

    #[test]
    fn file_errors_follow_io_kind() {
        let denied = StegError::File {
            path: "out.bmp".into(),
            source: io::ErrorKind::PermissionDenied.into(),
        };
        assert_eq!(steg_error(denied).code, PERMISSION_DENIED);

        let missing = StegError::File {
            path: "in.bmp".into(),
            source: io::ErrorKind::NotFound.into(),
        };
        let err = steg_error(missing);
        assert_eq!(err.code, FAILURE);
        assert!(err.message.contains("in.bmp"));
    }

    #[test]
    fn capacity_is_a_plain_failure() {
        let err = steg_error(StegError::CapacityExceeded {
            required: 136,
            available: 126,
        });
        assert_eq!(err.code, FAILURE);
    }

    #[test]
    fn malformed_carrier_is_invalid_data() {
        let err = carrier_error("read header", CarrierError::TooShort { len: 3, min: 26 });
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("read header: "));
    }
}
