mod cmd;
mod exit;
mod logging;
mod output;

use clap::{Parser, ValueEnum};

use bmpsteg_session::{CapacityPolicy, StegConfig};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "bmpsteg", version, about = "Hide files inside BMP images")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr). Default: RUST_LOG, else info.
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<LogLevel>,

    /// Capacity formula checked before encoding.
    #[arg(
        long,
        value_name = "POLICY",
        env = "BMPSTEG_CAPACITY_POLICY",
        default_value = "legacy",
        global = true
    )]
    capacity_policy: PolicyArg,

    /// Largest payload in bytes accepted when encoding or decoding.
    #[arg(long, value_name = "BYTES", env = "BMPSTEG_MAX_PAYLOAD", global = true)]
    max_payload: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PolicyArg {
    /// width * height * 3 against a fixed-overhead estimate.
    Legacy,
    /// Exact frame footprint against the pixel bytes in the file.
    Exact,
}

impl From<PolicyArg> for CapacityPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Legacy => CapacityPolicy::Legacy,
            PolicyArg::Exact => CapacityPolicy::Exact,
        }
    }
}

impl Cli {
    fn steg_config(&self) -> StegConfig {
        let config = StegConfig::default().with_capacity_policy(self.capacity_policy.into());
        match self.max_payload {
            Some(max) => config.with_max_payload(max),
            None => config,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let config = cli.steg_config();
    tracing::debug!(command = ?cli.command, policy = ?config.capacity_policy, "starting");
    let result = cmd::run(cli.command, format, config);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
