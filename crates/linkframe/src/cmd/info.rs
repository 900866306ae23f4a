use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use linkframe_frame::checksum::{ALGORITHM_NAME, CRC_LEN, CRC_SEED};
use linkframe_frame::{FrameConfig, FrameMode, DELIMITER};
use serde::Serialize;

use crate::cmd::InfoArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct ProtocolInfo {
    schema_id: &'static str,
    mode: &'static str,
    delimiter: Option<String>,
    max_payload_len: usize,
    max_packet_len: usize,
    crc_algorithm: Option<&'static str>,
    crc_seed: Option<String>,
    crc_len: usize,
}

pub fn run(_args: InfoArgs, config: &FrameConfig, format: OutputFormat) -> CliResult<i32> {
    config
        .validate()
        .map_err(|err| frame_error("invalid configuration", err))?;

    let info = protocol_info(config);
    print_info(&info, format);
    Ok(SUCCESS)
}

fn protocol_info(config: &FrameConfig) -> ProtocolInfo {
    let delimited = config.mode == FrameMode::Delimited;
    ProtocolInfo {
        schema_id: "https://schemas.3leaps.dev/linkframe/cli/v1/protocol-info.schema.json",
        mode: config.mode.as_str(),
        delimiter: delimited.then(|| format!("0x{DELIMITER:02X}")),
        max_payload_len: config.max_payload_len,
        max_packet_len: config.max_packet_len(),
        crc_algorithm: delimited.then_some(ALGORITHM_NAME),
        crc_seed: delimited.then(|| format!("0x{CRC_SEED:04X}")),
        crc_len: if delimited { CRC_LEN } else { 0 },
    }
}

fn print_info(info: &ProtocolInfo, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(info).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in info_rows(info) {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for (field, value) in info_rows(info) {
                println!("{field}: {value}");
            }
        }
    }
}

fn info_rows(info: &ProtocolInfo) -> Vec<(&'static str, String)> {
    let none = || "-".to_string();
    vec![
        ("mode", info.mode.to_string()),
        ("delimiter", info.delimiter.clone().unwrap_or_else(none)),
        ("max_payload_len", info.max_payload_len.to_string()),
        ("max_packet_len", info.max_packet_len.to_string()),
        (
            "crc_algorithm",
            info.crc_algorithm.map(str::to_string).unwrap_or_else(none),
        ),
        ("crc_seed", info.crc_seed.clone().unwrap_or_else(none)),
        ("crc_len", info.crc_len.to_string()),
    ]
}
