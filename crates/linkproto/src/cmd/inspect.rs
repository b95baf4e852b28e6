use std::fs;
use std::io::Read;

use linkproto::frame::Frame;
use linkproto::peer::unpack;

use crate::cmd::InspectArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{from_hex, print_frame, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = resolve_input(&args)?;
    let frame = Frame::decode(&wire).map_err(|err| frame_error("frame decode failed", err))?;

    let message = unpack(frame.payload());
    if let Err(err) = &message {
        tracing::warn!(error = %err, category = ?err.category(), "payload is not a valid message");
    }
    print_frame(&frame, &message, format);

    Ok(if message.is_ok() { SUCCESS } else { DATA_INVALID })
}

fn resolve_input(args: &InspectArgs) -> CliResult<Vec<u8>> {
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }

    let text = match &args.frame {
        Some(text) => text.clone(),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| io_error("failed reading stdin", err))?;
            text
        }
    };
    from_hex(&text).map_err(|err| CliError::new(DATA_INVALID, format!("invalid frame hex: {err}")))
}
