use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use linkproto::frame::{Address, EtherType};
use linkproto::peer::Kind;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod demo;
pub mod frame;
pub mod inspect;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a host/device session over a loopback link.
    Demo(DemoArgs),
    /// Encode a message into a frame and print it as hex.
    Frame(FrameArgs),
    /// Decode a hex-encoded frame and the message it carries.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Demo(args) => demo::run(args, format),
        Command::Frame(args) => frame::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Host link address.
    #[arg(long, default_value = "00:11:22:33:44:55")]
    pub host_address: Address,
    /// Device link address.
    #[arg(long, default_value = "aa:bb:cc:dd:ee:ff")]
    pub device_address: Address,
    /// Host poll steps after PING.
    #[arg(long, default_value = "20")]
    pub ping_steps: usize,
    /// Host poll steps while streaming.
    #[arg(long, default_value = "100")]
    pub stream_steps: usize,
    /// Host poll steps after STOP_STREAM.
    #[arg(long, default_value = "20")]
    pub stop_steps: usize,
    /// Host poll steps after the unknown command.
    #[arg(long, default_value = "20")]
    pub unknown_steps: usize,
    /// Delay between host steps (e.g. 10ms, 1s).
    #[arg(long, default_value = "10ms")]
    pub host_interval: String,
    /// Delay between device polls (e.g. 1ms).
    #[arg(long, default_value = "1ms")]
    pub device_interval: String,
    /// Flip one random bit in every frame the device sends.
    #[arg(long)]
    pub inject_faults: bool,
    /// Seed for fault injection. Random when omitted.
    #[arg(long, requires = "inject_faults")]
    pub seed: Option<u64>,
}

/// Message kind as accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Command,
    Response,
    Stream,
    Error,
}

impl From<KindArg> for Kind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Command => Kind::Command,
            KindArg::Response => Kind::Response,
            KindArg::Stream => Kind::Stream,
            KindArg::Error => Kind::Error,
        }
    }
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Destination address.
    #[arg(long, default_value = "aa:bb:cc:dd:ee:ff")]
    pub dst: Address,
    /// Source address.
    #[arg(long, default_value = "00:11:22:33:44:55")]
    pub src: Address,
    /// Frame type tag (ipv4, ipv6, arp).
    #[arg(long = "type", default_value = "ipv4")]
    pub ether_type: EtherType,
    /// Message kind.
    #[arg(long, value_enum, default_value = "command")]
    pub kind: KindArg,
    /// Message identifier (decimal or 0x-prefixed hex).
    #[arg(long, default_value = "1", value_parser = parse_byte)]
    pub id: u8,
    /// Message data as a UTF-8 string.
    #[arg(long, conflicts_with = "data_hex")]
    pub data: Option<String>,
    /// Message data as hex.
    #[arg(long, conflicts_with = "data")]
    pub data_hex: Option<String>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Hex-encoded frame. Read from stdin when neither this nor --file is given.
    #[arg(conflicts_with = "file")]
    pub frame: Option<String>,
    /// Read the raw frame bytes from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_byte(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("'{input}' is not a byte value (0-255 or 0x00-0xff)"))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
