use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use bmpsteg_carrier::CarrierHeader;
use bmpsteg_session::{
    image_capacity_bytes, max_payload_size, payload_extension, plan, CapacityPlan,
    CapacityPolicy, StegConfig,
};
use serde::Serialize;

use crate::cmd::{require_bmp, CapacityArgs};
use crate::exit::{carrier_error, io_error, steg_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_report, OutputFormat};

#[derive(Serialize)]
struct CapacityReport {
    carrier: PathBuf,
    width: u32,
    height: u32,
    pixel_data_offset: u32,
    pixel_bytes: u64,
    image_capacity_bytes: u64,
    policy: CapacityPolicy,
    max_payload_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<CapacityPlan>,
}

pub fn run(args: CapacityArgs, format: OutputFormat, config: StegConfig) -> CliResult<i32> {
    require_bmp(&args.carrier)?;

    let file = File::open(&args.carrier)
        .map_err(|err| io_error(&format!("cannot open {}", args.carrier.display()), err))?;
    let header = CarrierHeader::read_from(&mut BufReader::new(file))
        .map_err(|err| carrier_error("read carrier header", err))?;

    // Without a payload name, assume the longest extension the frame allows.
    let (extension_len, payload_size) = match (&args.payload, args.size) {
        (Some(path), _) => {
            let extension =
                payload_extension(&path.to_string_lossy(), config.frame.max_extension_len)
                    .map_err(steg_error)?;
            let size = std::fs::metadata(path)
                .map_err(|err| io_error(&format!("cannot stat {}", path.display()), err))?
                .len();
            (extension.len(), Some(size))
        }
        (None, size) => (config.frame.max_extension_len, size),
    };

    let policy = config.capacity_policy;
    let report = CapacityReport {
        carrier: args.carrier,
        width: header.width,
        height: header.height,
        pixel_data_offset: header.pixel_data_offset,
        pixel_bytes: header.pixel_bytes(),
        image_capacity_bytes: image_capacity_bytes(header.width, header.height),
        policy,
        max_payload_size: max_payload_size(&header, extension_len, policy),
        plan: payload_size.map(|size| plan(&header, extension_len, size, policy)),
    };

    let mut fields = vec![
        ("carrier", report.carrier.display().to_string()),
        ("geometry", format!("{}x{}", report.width, report.height)),
        ("pixel_bytes", report.pixel_bytes.to_string()),
        ("image_capacity_bytes", report.image_capacity_bytes.to_string()),
        ("policy", format!("{policy:?}").to_lowercase()),
        ("max_payload_size", report.max_payload_size.to_string()),
    ];
    if let Some(plan) = &report.plan {
        fields.push(("payload_size", plan.payload_size.to_string()));
        fields.push(("required", plan.required().to_string()));
        fields.push(("available", plan.available().to_string()));
        fields.push(("fits", plan.fits.to_string()));
    }
    print_report(&report, &fields, &report.max_payload_size.to_string(), format);

    match &report.plan {
        Some(plan) if !plan.fits => Ok(FAILURE),
        _ => Ok(SUCCESS),
    }
}
