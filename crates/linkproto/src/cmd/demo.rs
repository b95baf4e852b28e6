use linkproto::demo::{self, DemoConfig};

use crate::cmd::{parse_duration, DemoArgs};
use crate::exit::{demo_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat};

pub fn run(args: DemoArgs, format: OutputFormat) -> CliResult<i32> {
    let config = DemoConfig {
        host_address: args.host_address,
        device_address: args.device_address,
        ping_steps: args.ping_steps,
        stream_steps: args.stream_steps,
        stop_steps: args.stop_steps,
        unknown_steps: args.unknown_steps,
        host_interval: parse_duration(&args.host_interval)?,
        device_interval: parse_duration(&args.device_interval)?,
        fault_seed: args
            .inject_faults
            .then(|| args.seed.unwrap_or_else(rand::random)),
    };

    if let Some(seed) = config.fault_seed {
        tracing::info!(seed, "fault injection enabled on device frames");
    }
    tracing::info!(
        host = %config.host_address,
        device = %config.device_address,
        "starting session"
    );

    let report = demo::run(&config).map_err(demo_error)?;
    tracing::info!(
        events = report.events.len(),
        dropped = report.dropped,
        "session complete"
    );
    print_report(&report, format);

    Ok(SUCCESS)
}
