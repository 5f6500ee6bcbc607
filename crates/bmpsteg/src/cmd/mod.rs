use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use bmpsteg_session::{is_bmp_name, StegConfig};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod capacity;
pub mod decode;
pub mod encode;
pub mod inspect;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Hide a file inside a copy of a BMP image.
    Encode(EncodeArgs),
    /// Recover a hidden file from a stego BMP image.
    Decode(DecodeArgs),
    /// Report how much a BMP image can hold.
    Capacity(CapacityArgs),
    /// Show the hidden frame fields without extracting anything.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: StegConfig) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format, config),
        Command::Decode(args) => decode::run(args, format, config),
        Command::Capacity(args) => capacity::run(args, format, config),
        Command::Inspect(args) => inspect::run(args, format, config),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Source image (.bmp).
    pub carrier: PathBuf,
    /// File to hide. Its extension is recorded with the data.
    pub secret: PathBuf,
    /// Stego image to write. Default: stegged_<build-time>_default.bmp.
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Stego image (.bmp).
    pub carrier: PathBuf,
    /// File to write the recovered data to, used as-is.
    /// Default: destegged_<build-time>_default.<ext>.
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// Image to measure (.bmp).
    pub carrier: PathBuf,
    /// Check whether this file fits.
    #[arg(long, value_name = "FILE", conflicts_with = "size")]
    pub payload: Option<PathBuf>,
    /// Check whether a payload of this many bytes fits.
    #[arg(long, value_name = "BYTES", conflicts_with = "payload")]
    pub size: Option<u64>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Stego image (.bmp).
    pub carrier: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Carrier arguments must name a bitmap.
fn require_bmp(path: &Path) -> CliResult<()> {
    if is_bmp_name(&path.to_string_lossy()) {
        return Ok(());
    }
    Err(CliError::new(
        USAGE,
        format!("{} is not a .bmp file", path.display()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carrier_must_be_bmp() {
        assert!(require_bmp(Path::new("cover.bmp")).is_ok());
        assert!(require_bmp(Path::new("dir/COVER.BMP")).is_ok());

        let err = require_bmp(Path::new("cover.png")).unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
