use std::path::PathBuf;

use bmpsteg_session::{Decoder, FrameInfo, StegConfig};
use serde::Serialize;

use crate::cmd::{require_bmp, InspectArgs};
use crate::exit::{steg_error, CliResult, NO_HIDDEN_DATA, SUCCESS};
use crate::output::{print_report, OutputFormat};

#[derive(Serialize)]
struct InspectOutput {
    carrier: PathBuf,
    hidden: bool,
    #[serde(flatten)]
    frame: Option<FrameInfo>,
}

pub fn run(args: InspectArgs, format: OutputFormat, config: StegConfig) -> CliResult<i32> {
    require_bmp(&args.carrier)?;

    let frame = Decoder::with_config(config)
        .inspect_file(&args.carrier)
        .map_err(steg_error)?;

    let out = InspectOutput {
        carrier: args.carrier,
        hidden: frame.is_some(),
        frame,
    };

    let mut fields = vec![
        ("carrier", out.carrier.display().to_string()),
        ("hidden", out.hidden.to_string()),
    ];
    if let Some(frame) = &out.frame {
        fields.push(("extension", frame.extension.clone()));
        fields.push(("payload_size", frame.payload_size.to_string()));
        fields.push(("frame_bytes", frame.frame_bytes.to_string()));
        fields.push(("complete", frame.complete.to_string()));
    }
    let raw = out
        .frame
        .as_ref()
        .map(|frame| frame.extension.clone())
        .unwrap_or_default();
    print_report(&out, &fields, &raw, format);

    Ok(if out.hidden { SUCCESS } else { NO_HIDDEN_DATA })
}
