//! Recover a hidden payload from a stego BMP.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bmpsteg_carrier::CarrierHeader;
use bmpsteg_frame::{wire_size, FieldReader, FrameError, BLOCK_SIZE, MAGIC};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::StegConfig;
use crate::error::{ErrorKind, Result, StageExt, StegError};
use crate::stage::Stage;

/// Summary of a completed decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeReport {
    /// Recovered file path, when decoding to a file.
    pub output: Option<PathBuf>,
    pub extension: String,
    pub payload_size: u64,
    pub pixel_data_offset: u32,
}

/// Frame fields found in a carrier, read without extracting the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameInfo {
    pub extension: String,
    pub payload_size: u64,
    pub pixel_data_offset: u32,
    /// Carrier bytes the frame occupies.
    pub frame_bytes: u64,
    /// Whether the carrier holds every payload block the size field declares.
    pub complete: bool,
}

/// Runs decode sessions.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: StegConfig,
}

impl Decoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: StegConfig) -> Self {
        Self { config }
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &StegConfig {
        &self.config
    }

    /// Recover the payload hidden in `carrier`.
    ///
    /// The output is `output` when given (used as-is), otherwise the default
    /// name with the recovered extension. It is created only after the magic
    /// marker and the extension have been read.
    pub fn decode_file(&self, carrier: &Path, output: Option<&Path>) -> Result<DecodeReport> {
        let file = File::open(carrier)
            .map_err(|source| StegError::File {
                path: carrier.to_path_buf(),
                source,
            })
            .at(Stage::OpenCarrier)?;

        let mut created = None;
        let mut report = self.decode(BufReader::new(file), |extension| {
            let path = self.config.naming.decode_output(output, extension);
            let file = File::create(&path).map_err(|source| StegError::File {
                path: path.clone(),
                source,
            })?;
            created = Some(path);
            Ok(BufWriter::new(file))
        })?;
        report.output = created;
        Ok(report)
    }

    /// Recover the payload hidden in `carrier` into the stream returned by
    /// `open_output`, which receives the recovered extension.
    pub fn decode<C, W, F>(&self, carrier: C, open_output: F) -> Result<DecodeReport>
    where
        C: Read + Seek,
        W: Write,
        F: FnOnce(&str) -> Result<W>,
    {
        let mut session = DecodingSession::open(carrier)?;
        let header = session.header;
        let mut reader = FieldReader::with_config(&mut session.carrier, self.config.frame.clone());

        detect_magic(&mut reader)?;
        let extension = read_extension(&mut reader)?;

        let mut output = open_output(&extension).at(Stage::CreateOutput)?;
        debug!(stage = %Stage::CreateOutput, extension = %extension, "output created");

        let payload_size = reader.read_size().at(Stage::ExtractPayload)?;
        check_payload_size(&header, &reader, payload_size, &self.config).at(Stage::ExtractPayload)?;
        let payload = reader
            .read_exact_bytes(payload_size, "payload")
            .at(Stage::ExtractPayload)?;
        output.write_all(&payload).at(Stage::ExtractPayload)?;
        debug!(stage = %Stage::ExtractPayload, payload_size, "payload extracted");

        output.flush().at(Stage::Close)?;

        info!(extension = %extension, payload_size, "payload recovered");
        Ok(DecodeReport {
            output: None,
            extension,
            payload_size,
            pixel_data_offset: header.pixel_data_offset,
        })
    }

    /// Read the frame fields of `carrier` without extracting the payload.
    ///
    /// Returns `Ok(None)` when the carrier holds no hidden data.
    pub fn inspect<C: Read + Seek>(&self, carrier: C) -> Result<Option<FrameInfo>> {
        let mut session = DecodingSession::open(carrier)?;
        let header = session.header;
        let mut reader = FieldReader::with_config(&mut session.carrier, self.config.frame.clone());

        match detect_magic(&mut reader) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NoHiddenData => return Ok(None),
            Err(err) => return Err(err),
        }
        let extension = read_extension(&mut reader)?;
        let payload_size = reader.read_size().at(Stage::ExtractPayload)?;

        Ok(Some(FrameInfo {
            frame_bytes: wire_size(extension.len(), payload_size),
            complete: payload_size <= remaining_blocks(&header, &reader),
            extension,
            payload_size,
            pixel_data_offset: header.pixel_data_offset,
        }))
    }

    /// Read the frame fields of the carrier file at `path`.
    pub fn inspect_file(&self, path: &Path) -> Result<Option<FrameInfo>> {
        let file = File::open(path)
            .map_err(|source| StegError::File {
                path: path.to_path_buf(),
                source,
            })
            .at(Stage::OpenCarrier)?;
        self.inspect(BufReader::new(file))
    }
}

/// One decode call: the carrier positioned at its first pixel byte.
struct DecodingSession<C> {
    carrier: C,
    header: CarrierHeader,
}

impl<C: Read + Seek> DecodingSession<C> {
    fn open(mut carrier: C) -> Result<Self> {
        let header = CarrierHeader::read_from(&mut carrier).at(Stage::OpenCarrier)?;
        carrier
            .seek(SeekFrom::Start(u64::from(header.pixel_data_offset)))
            .at(Stage::OpenCarrier)?;
        debug!(stage = %Stage::OpenCarrier, offset = header.pixel_data_offset, "carrier opened");
        Ok(Self { carrier, header })
    }
}

fn detect_magic<R: Read>(reader: &mut FieldReader<R>) -> Result<()> {
    if !reader.matches_magic(&MAGIC).at(Stage::DetectMagic)? {
        return Err(StegError::NoHiddenData).at(Stage::DetectMagic);
    }
    debug!(stage = %Stage::DetectMagic, "magic detected");
    Ok(())
}

fn read_extension<R: Read>(reader: &mut FieldReader<R>) -> Result<String> {
    let extension = reader
        .read_extension()
        .map_err(|err| match err {
            FrameError::FieldTooLong { max } => StegError::ExtensionTooLong { max },
            other => StegError::Frame(other),
        })
        .at(Stage::ExtractExtension)?;

    if extension.contains(['/', '\\', '\0']) {
        return Err(StegError::InvalidInput(format!(
            "recovered extension {extension:?} is not a plain file suffix"
        )))
        .at(Stage::ExtractExtension);
    }
    debug!(stage = %Stage::ExtractExtension, extension = %extension, "extension read");
    Ok(extension)
}

fn remaining_blocks<R: Read>(header: &CarrierHeader, reader: &FieldReader<R>) -> u64 {
    (header.pixel_bytes() / BLOCK_SIZE as u64).saturating_sub(reader.blocks_read())
}

fn check_payload_size<R: Read>(
    header: &CarrierHeader,
    reader: &FieldReader<R>,
    payload_size: u64,
    config: &StegConfig,
) -> Result<()> {
    if payload_size > config.frame.max_payload_size {
        return Err(FrameError::PayloadTooLarge {
            size: payload_size,
            max: config.frame.max_payload_size,
        }
        .into());
    }
    if payload_size > remaining_blocks(header, reader) {
        return Err(FrameError::Truncated { field: "payload" }.into());
    }
    Ok(())
}
