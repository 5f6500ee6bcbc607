use bmpsteg_session::{EncodeReport, Encoder, StegConfig};

use crate::cmd::{require_bmp, EncodeArgs};
use crate::exit::{steg_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat, config: StegConfig) -> CliResult<i32> {
    require_bmp(&args.carrier)?;

    let report = Encoder::with_config(config)
        .encode_file(&args.carrier, &args.secret, args.output.as_deref())
        .map_err(steg_error)?;

    print_encode(&report, format);
    Ok(SUCCESS)
}

fn print_encode(report: &EncodeReport, format: OutputFormat) {
    let output = report
        .output
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    let fields = [
        ("output", output.clone()),
        ("extension", report.extension.clone()),
        ("payload_size", report.payload_size.to_string()),
        ("frame_bytes", report.frame_bytes.to_string()),
        (
            "capacity",
            format!(
                "{}/{} ({:?})",
                report.capacity.required(),
                report.capacity.available(),
                report.capacity.policy
            ),
        ),
    ];
    print_report(report, &fields, &output, format);
}
