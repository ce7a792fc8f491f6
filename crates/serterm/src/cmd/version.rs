use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("serterm {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: serterm");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "build_target: {}",
        option_env!("SERTERM_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("SERTERM_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "frame: header={}B max_payload={}B byte_order=little",
        serterm_frame::HEADER_SIZE,
        serterm_frame::MAX_PAYLOAD
    );

    Ok(SUCCESS)
}
