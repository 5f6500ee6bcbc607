//! Output naming and payload extension rules.

use std::path::{Path, PathBuf};

use crate::error::{Result, StegError};

/// Build time of day (`HH-MM-SS`, UTC) embedded in default output names.
pub const BUILD_TIME: &str = env!("BMPSTEG_BUILD_TIME");

const ENCODE_PREFIX: &str = "stegged_";
const DECODE_PREFIX: &str = "destegged_";
const DEFAULT_SUFFIX: &str = "_default";

/// How output files are named when the caller does not supply one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPolicy {
    /// Directory default names are created in.
    pub directory: PathBuf,
    /// Token embedded between prefix and suffix.
    pub stamp: String,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            directory: PathBuf::new(),
            stamp: BUILD_TIME.to_string(),
        }
    }
}

impl NamingPolicy {
    /// Name of the stego image. A supplied name is used as-is.
    pub fn encode_output(&self, requested: Option<&Path>) -> PathBuf {
        match requested {
            Some(path) => path.to_path_buf(),
            None => self
                .directory
                .join(format!("{ENCODE_PREFIX}{}{DEFAULT_SUFFIX}.bmp", self.stamp)),
        }
    }

    /// Name of the recovered file. A supplied name is used as-is; otherwise the
    /// recovered extension is appended to the default name.
    pub fn decode_output(&self, requested: Option<&Path>, extension: &str) -> PathBuf {
        match requested {
            Some(path) => path.to_path_buf(),
            None => self.directory.join(format!(
                "{DECODE_PREFIX}{}{DEFAULT_SUFFIX}.{extension}",
                self.stamp
            )),
        }
    }
}

/// Extension of a payload file name: the text after the last `.`.
///
/// Fails with `NoExtension` when there is no dot or nothing follows it, and
/// with `ExtensionTooLong` when more than `max_len` bytes follow it.
pub fn payload_extension(name: &str, max_len: usize) -> Result<String> {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let extension = match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => return Err(StegError::NoExtension(name.to_string())),
    };
    if extension.len() > max_len {
        return Err(StegError::ExtensionTooLong { max: max_len });
    }
    if extension.contains('*') {
        return Err(StegError::InvalidInput(format!(
            "extension {extension:?} contains the field separator"
        )));
    }
    Ok(extension.to_string())
}

/// True when `name` looks like a bitmap file name (`.bmp`, any case).
pub fn is_bmp_name(name: &str) -> bool {
    name.len() >= 4
        && name
            .get(name.len() - 4..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(".bmp"))
}
