//! Pipeline stages of an encode or decode session.
//!
//! Every error surfaced by a session names the stage it failed in.

use std::fmt;

/// A step of the encode or decode pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    // Encode
    OpenStreams,
    SizeCheck,
    CapacityCheck,
    CopyHeader,
    StampMagic,
    StampExtension,
    StampSize,
    StampPayload,
    CopyTail,
    // Decode
    OpenCarrier,
    DetectMagic,
    ExtractExtension,
    CreateOutput,
    ExtractPayload,
    // Both
    Close,
}

impl Stage {
    /// Human-readable stage name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::OpenStreams => "open streams",
            Stage::SizeCheck => "size check",
            Stage::CapacityCheck => "capacity check",
            Stage::CopyHeader => "copy header",
            Stage::StampMagic => "stamp magic",
            Stage::StampExtension => "stamp extension",
            Stage::StampSize => "stamp size",
            Stage::StampPayload => "stamp payload",
            Stage::CopyTail => "copy tail",
            Stage::OpenCarrier => "open carrier",
            Stage::DetectMagic => "detect magic",
            Stage::ExtractExtension => "extract extension",
            Stage::CreateOutput => "create output",
            Stage::ExtractPayload => "extract payload",
            Stage::Close => "close",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_readable_names() {
        assert_eq!(Stage::StampPayload.to_string(), "stamp payload");
        assert_eq!(Stage::DetectMagic.to_string(), "detect magic");
    }
}
