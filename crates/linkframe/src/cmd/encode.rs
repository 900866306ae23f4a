use std::fs;

use linkframe_frame::{FrameConfig, ProtocolHandler};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{parse_hex, print_wire, OutputFormat};

pub fn run(args: EncodeArgs, config: &FrameConfig, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let wire = encode(config, &payload)?;
    tracing::debug!(
        mode = %config.mode,
        payload_size = payload.len(),
        wire_size = wire.len(),
        "encoded frame"
    );

    print_wire(config.mode, payload.len(), &wire, format);
    Ok(SUCCESS)
}

fn encode(config: &FrameConfig, payload: &[u8]) -> CliResult<Vec<u8>> {
    let mut rx_buf = vec![0u8; config.max_payload_len];
    let mut handler = ProtocolHandler::new(*config, &mut rx_buf, Vec::new(), |_: &[u8]| {})
        .map_err(|err| frame_error("invalid configuration", err))?;

    handler
        .send_message(payload)
        .map_err(|err| frame_error("encode failed", err))?;

    let (wire, _) = handler.into_parts();
    Ok(wire)
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex)
            .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")));
    }
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}
