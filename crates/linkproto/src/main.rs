mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "linkproto", version, about = "Framed command protocol over a simulated link")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_demo_subcommand() {
        let cli = Cli::try_parse_from([
            "linkproto",
            "demo",
            "--stream-steps",
            "5",
            "--inject-faults",
            "--seed",
            "7",
        ])
        .expect("demo args should parse");

        assert!(matches!(cli.command, Command::Demo(_)));
    }

    #[test]
    fn parses_frame_subcommand() {
        let cli = Cli::try_parse_from([
            "linkproto",
            "frame",
            "--dst",
            "aa:bb:cc:dd:ee:ff",
            "--kind",
            "command",
            "--id",
            "0x01",
        ])
        .expect("frame args should parse");
        assert!(matches!(cli.command, Command::Frame(_)));
    }

    #[test]
    fn rejects_malformed_address() {
        let err = Cli::try_parse_from(["linkproto", "frame", "--dst", "aa:bb"])
            .expect_err("short address should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_conflicting_inspect_inputs() {
        let err = Cli::try_parse_from(["linkproto", "inspect", "00ff", "--file", "/tmp/frame.bin"])
            .expect_err("conflicting args should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
