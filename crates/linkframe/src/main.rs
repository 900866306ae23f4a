mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use linkframe_frame::{FrameConfig, FrameMode, MAX_PAYLOAD_LEN};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "linkframe", version, about = "Serial link framing CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Framing mode: delimited (UART byte stream) or direct (CAN).
    #[arg(
        long,
        value_name = "MODE",
        env = "LINKFRAME_MODE",
        default_value = "delimited",
        global = true
    )]
    mode: FrameMode,

    /// Maximum payload length in bytes (1-255).
    #[arg(
        long,
        value_name = "BYTES",
        env = "LINKFRAME_MAX_PAYLOAD",
        default_value_t = MAX_PAYLOAD_LEN,
        global = true
    )]
    max_payload: usize,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            mode: self.mode,
            max_payload_len: self.max_payload,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let config = cli.frame_config();
    let result = cmd::run(cli.command, &config, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
