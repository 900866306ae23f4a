use clap::{Args, Subcommand};
use linkframe_frame::FrameConfig;
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod info;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a payload into its wire representation.
    Encode(EncodeArgs),
    /// Decode wire bytes and print every valid message.
    Decode(DecodeArgs),
    /// Show protocol constants for the selected mode.
    Info(InfoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, config: &FrameConfig, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, config, format),
        Command::Decode(args) => decode::run(args, config, format),
        Command::Info(args) => info::run(args, config, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Payload as hex (e.g. "01 02" or "0102").
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Payload as a UTF-8 string.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["hex", "data"])]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Wire bytes as hex. Reads raw bytes from stdin when neither this nor
    /// --file is given.
    #[arg(conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read raw wire bytes from file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct InfoArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
