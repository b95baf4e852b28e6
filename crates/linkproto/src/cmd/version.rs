use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("linkproto {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: linkproto");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("LINKPROTO_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("LINKPROTO_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("features: peer={}, cli=true", cfg!(feature = "peer"));
    println!(
        "frame: payload {}..={} bytes, frame {}..={} bytes",
        linkproto::frame::PAYLOAD_LEN_MIN,
        linkproto::frame::PAYLOAD_LEN_MAX,
        linkproto::frame::FRAME_LEN_MIN,
        linkproto::frame::FRAME_LEN_MAX
    );

    Ok(SUCCESS)
}
