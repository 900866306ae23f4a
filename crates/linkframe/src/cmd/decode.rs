use std::fs::File;
use std::io::{Cursor, Read};

use linkframe_frame::{FrameConfig, FramePump, ProtocolHandler, PumpStats};
use linkframe_transport::FrameCollector;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{parse_hex, print_message, OutputFormat};

pub fn run(args: DecodeArgs, config: &FrameConfig, format: OutputFormat) -> CliResult<i32> {
    let (messages, stats) = if let Some(hex) = &args.hex {
        let wire = parse_hex(hex)
            .map_err(|err| CliError::new(USAGE, format!("wire input is not valid hex: {err}")))?;
        decode(config, Cursor::new(wire))?
    } else if let Some(path) = &args.file {
        let file = File::open(path)
            .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
        decode(config, file)?
    } else {
        decode(config, std::io::stdin().lock())?
    };

    for (index, message) in messages.messages().iter().enumerate() {
        print_message(index, config.mode, message, format);
    }

    tracing::info!(
        bytes = stats.bytes,
        frames = stats.frames,
        errors = stats.errors,
        "decode finished"
    );

    if stats.errors > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{} malformed frame(s) dropped", stats.errors),
        ));
    }
    Ok(SUCCESS)
}

fn decode<R: Read>(config: &FrameConfig, input: R) -> CliResult<(FrameCollector, PumpStats)> {
    let mut rx_buf = vec![0u8; config.max_payload_len];
    let mut handler = ProtocolHandler::new(*config, &mut rx_buf, Vec::new(), FrameCollector::new())
        .map_err(|err| frame_error("invalid configuration", err))?;

    let stats = FramePump::new(input)
        .run(&mut handler)
        .map_err(|err| frame_error("decode failed", err))?;

    let (_, messages) = handler.into_parts();
    Ok((messages, stats))
}
