use bmpsteg_session::{Decoder, StegConfig};

use crate::cmd::{require_bmp, DecodeArgs};
use crate::exit::{steg_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat, config: StegConfig) -> CliResult<i32> {
    require_bmp(&args.carrier)?;

    let report = Decoder::with_config(config)
        .decode_file(&args.carrier, args.output.as_deref())
        .map_err(steg_error)?;

    let output = report
        .output
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    let fields = [
        ("output", output.clone()),
        ("extension", report.extension.clone()),
        ("payload_size", report.payload_size.to_string()),
    ];
    print_report(&report, &fields, &output, format);
    Ok(SUCCESS)
}
