use linkproto::frame::Frame;
use linkproto::peer::{pack, MessageId};

use crate::cmd::FrameArgs;
use crate::exit::{frame_error, message_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{from_hex, print_encoded, OutputFormat};

pub fn run(args: FrameArgs, format: OutputFormat) -> CliResult<i32> {
    let data = resolve_data(&args)?;
    let id = MessageId::from_parts(args.kind.into(), args.id);

    let payload = pack(id, &data).map_err(|err| message_error("message encode failed", err))?;
    let frame = Frame::new(args.dst, args.src, args.ether_type, payload)
        .map_err(|err| frame_error("frame encode failed", err))?;

    tracing::debug!(
        kind = id.kind().name(),
        id = id.raw(),
        data_len = data.len(),
        wire_size = frame.wire_size(),
        "encoded frame"
    );
    print_encoded(&frame, format);

    Ok(SUCCESS)
}

fn resolve_data(args: &FrameArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(hex) = &args.data_hex {
        return from_hex(hex).map_err(|err| CliError::new(USAGE, format!("--data-hex: {err}")));
    }
    Ok(Vec::new())
}
