//! Hide a payload file inside a copy of a BMP carrier.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bmpsteg_carrier::CarrierHeader;
use bmpsteg_frame::{
    extension_field, size_field, FieldWriter, FrameError, BLOCK_SIZE, MAGIC, SEPARATOR,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::capacity::{plan, CapacityPlan};
use crate::config::StegConfig;
use crate::error::{Result, StageExt, StegError};
use crate::naming::payload_extension;
use crate::stage::Stage;

/// Summary of a completed encode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeReport {
    /// Destination path, when encoding to a file.
    pub output: Option<PathBuf>,
    pub extension: String,
    pub payload_size: u64,
    pub pixel_data_offset: u32,
    /// Carrier bytes rewritten with hidden bits.
    pub frame_bytes: u64,
    /// Total bytes written to the destination.
    pub bytes_written: u64,
    pub capacity: CapacityPlan,
}

/// Runs encode sessions.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: StegConfig,
}

impl Encoder {
    /// Create an encoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with explicit configuration.
    pub fn with_config(config: StegConfig) -> Self {
        Self { config }
    }

    /// Current encoder configuration.
    pub fn config(&self) -> &StegConfig {
        &self.config
    }

    /// Hide `payload` in a copy of `carrier`.
    ///
    /// The destination is `output` when given, otherwise the default stego
    /// name. It is created only once the capacity check has passed.
    pub fn encode_file(
        &self,
        carrier: &Path,
        payload: &Path,
        output: Option<&Path>,
    ) -> Result<EncodeReport> {
        let carrier_file = open(carrier).at(Stage::OpenStreams)?;
        let payload_file = open(payload).at(Stage::OpenStreams)?;
        let dest_path = self.config.naming.encode_output(output);
        let payload_name = payload.to_string_lossy();

        let mut report = self.encode(
            BufReader::new(carrier_file),
            BufReader::new(payload_file),
            &payload_name,
            || {
                File::create(&dest_path)
                    .map(BufWriter::new)
                    .map_err(|source| StegError::File {
                        path: dest_path.clone(),
                        source,
                    })
            },
        )?;
        report.output = Some(dest_path);
        Ok(report)
    }

    /// Hide `payload` in a copy of `carrier` written to the stream returned
    /// by `open_dest`.
    ///
    /// `payload_name` supplies the extension recorded in the frame.
    /// `open_dest` is not called if the payload is rejected.
    pub fn encode<C, P, W, F>(
        &self,
        carrier: C,
        payload: P,
        payload_name: &str,
        open_dest: F,
    ) -> Result<EncodeReport>
    where
        C: Read + Seek,
        P: Read + Seek,
        W: Write,
        F: FnOnce() -> Result<W>,
    {
        EncodingSession::start(&self.config, carrier, payload, payload_name)?.run(open_dest)
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| StegError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// One encode call: owns its streams until it finishes or fails.
struct EncodingSession<'a, C, P> {
    config: &'a StegConfig,
    carrier: C,
    payload: P,
    extension: String,
    payload_size: u64,
}

impl<'a, C: Read + Seek, P: Read + Seek> EncodingSession<'a, C, P> {
    fn start(config: &'a StegConfig, carrier: C, mut payload: P, payload_name: &str) -> Result<Self> {
        let payload_size = io::copy(&mut payload, &mut io::sink()).at(Stage::SizeCheck)?;
        if payload_size == 0 {
            return Err(StegError::EmptyPayload).at(Stage::SizeCheck);
        }
        let max = config.frame.max_payload_size;
        if payload_size > max {
            // Decoding under the same config would refuse the frame.
            return Err(FrameError::PayloadTooLarge {
                size: payload_size,
                max,
            })
            .at(Stage::SizeCheck);
        }
        payload.rewind().at(Stage::SizeCheck)?;
        debug!(stage = %Stage::SizeCheck, payload_size, "payload measured");

        let extension = payload_extension(payload_name, config.frame.max_extension_len)
            .at(Stage::StampExtension)?;

        Ok(Self {
            config,
            carrier,
            payload,
            extension,
            payload_size,
        })
    }

    fn run<W, F>(mut self, open_dest: F) -> Result<EncodeReport>
    where
        W: Write,
        F: FnOnce() -> Result<W>,
    {
        let header = CarrierHeader::read_from(&mut self.carrier).at(Stage::CapacityCheck)?;
        let capacity = plan(
            &header,
            self.extension.len(),
            self.payload_size,
            self.config.capacity_policy,
        );
        capacity.check().at(Stage::CapacityCheck)?;
        debug!(
            stage = %Stage::CapacityCheck,
            required = capacity.required(),
            available = capacity.available(),
            "payload fits"
        );

        let mut dest = open_dest().at(Stage::OpenStreams)?;

        let offset = u64::from(header.pixel_data_offset);
        self.carrier.seek(SeekFrom::Start(0)).at(Stage::CopyHeader)?;
        let copied = io::copy(&mut (&mut self.carrier).take(offset), &mut dest).at(Stage::CopyHeader)?;
        if copied != offset {
            return Err(FrameError::Truncated { field: "header" }).at(Stage::CopyHeader);
        }
        debug!(stage = %Stage::CopyHeader, bytes = copied, "header copied");

        let mut writer = FieldWriter::new(&mut self.carrier, &mut dest);
        writer.write_field(&MAGIC, "magic").at(Stage::StampMagic)?;

        let ext_field = extension_field(&self.extension, self.config.frame.max_extension_len)
            .at(Stage::StampExtension)?;
        writer.write_field(&ext_field, "extension").at(Stage::StampExtension)?;

        writer
            .write_field(&size_field(self.payload_size), "size")
            .at(Stage::StampSize)?;

        let mut data = Vec::with_capacity(self.payload_size as usize);
        self.payload.read_to_end(&mut data).at(Stage::StampPayload)?;
        if data.len() as u64 != self.payload_size {
            return Err(StegError::InvalidInput(format!(
                "payload changed size from {} to {} bytes during encode",
                self.payload_size,
                data.len()
            )))
            .at(Stage::StampPayload);
        }
        data.push(SEPARATOR);
        writer.write_field(&data, "payload").at(Stage::StampPayload)?;
        let frame_bytes = writer.blocks_written() * BLOCK_SIZE as u64;
        debug!(stage = %Stage::StampPayload, frame_bytes, "frame stamped");

        let (carrier, dest) = writer.into_parts();
        let tail = io::copy(carrier, dest).at(Stage::CopyTail)?;
        debug!(stage = %Stage::CopyTail, bytes = tail, "tail copied");

        dest.flush().at(Stage::Close)?;

        let report = EncodeReport {
            output: None,
            extension: self.extension,
            payload_size: self.payload_size,
            pixel_data_offset: header.pixel_data_offset,
            frame_bytes,
            bytes_written: offset + frame_bytes + tail,
            capacity,
        };
        info!(
            extension = %report.extension,
            payload_size = report.payload_size,
            bytes = report.bytes_written,
            "payload hidden"
        );
        Ok(report)
    }
}
