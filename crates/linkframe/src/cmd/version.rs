use linkframe_frame::checksum::ALGORITHM_NAME;
use linkframe_frame::{DELIMITER, MAX_PAYLOAD_LEN};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

const NAME: &str = "linkframe";

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("{NAME} {}", env!("CARGO_PKG_VERSION"));
    if !args.extended {
        return Ok(SUCCESS);
    }

    let target = option_env!("LINKFRAME_BUILD_TARGET").unwrap_or("unknown");
    println!("target: {target}");
    println!(
        "host: {}-{}",
        std::env::consts::ARCH,
        std::env::consts::OS
    );
    // Peers interoperate only when these match.
    println!("checksum: {ALGORITHM_NAME}");
    println!("delimiter: 0x{DELIMITER:02X}");
    println!("max_payload_default: {MAX_PAYLOAD_LEN}");

    Ok(SUCCESS)
}
