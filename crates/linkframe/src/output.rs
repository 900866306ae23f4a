use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use linkframe_frame::FrameMode;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct WireOutput<'a> {
    schema_id: &'a str,
    mode: &'a str,
    payload_size: usize,
    wire_size: usize,
    wire: String,
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    schema_id: &'a str,
    index: usize,
    mode: &'a str,
    payload_size: usize,
    payload: String,
    text: Option<&'a str>,
}

/// Print the wire encoding of one payload.
pub fn print_wire(mode: FrameMode, payload_size: usize, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = WireOutput {
                schema_id: "https://schemas.3leaps.dev/linkframe/cli/v1/encoded-frame.schema.json",
                mode: mode.as_str(),
                payload_size,
                wire_size: wire.len(),
                wire: to_hex(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["MODE", "PAYLOAD", "WIRE SIZE", "WIRE"])
                .add_row(vec![
                    mode.to_string(),
                    payload_size.to_string(),
                    wire.len().to_string(),
                    to_hex(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", to_hex(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

/// Print one decoded message.
pub fn print_message(index: usize, mode: FrameMode, payload: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                schema_id: "https://schemas.3leaps.dev/linkframe/cli/v1/message-received.schema.json",
                index,
                mode: mode.as_str(),
                payload_size: payload.len(),
                payload: to_hex(payload),
                text: printable_text(payload),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "SIZE", "PAYLOAD", "TEXT"])
                .add_row(vec![
                    index.to_string(),
                    payload.len().to_string(),
                    to_hex(payload),
                    printable_text(payload).unwrap_or("").to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "#{index} size={} payload={}",
                payload.len(),
                to_hex(payload)
            );
        }
        OutputFormat::Raw => print_raw(payload),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Space separated upper-case hex, e.g. `7E 02 01 02`.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse hex such as `7E 02 01`, `7e0201` or `0x7E,0x02`.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let mut digits = String::with_capacity(input.len());
    for token in input.split(|c: char| c.is_whitespace() || c == ',' || c == ':') {
        let token = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        // Single-digit bytes are allowed when separated, e.g. "7E 2 1".
        if token.len() == 1 {
            digits.push('0');
        }
        digits.push_str(token);
    }

    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(format!("invalid hex digit {bad:?}"));
    }
    if digits.len() % 2 != 0 {
        return Err("odd number of hex digits".to_string());
    }

    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).map_err(|err| err.to_string())?;
            u8::from_str_radix(text, 16).map_err(|err| err.to_string())
        })
        .collect()
}

fn printable_text(payload: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(payload).ok()?;
    if !text.is_empty() && text.chars().all(|c| !c.is_control()) {
        Some(text)
    } else {
        None
    }
}
