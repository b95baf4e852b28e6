use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use linkproto::demo::DemoReport;
use linkproto::frame::Frame;
use linkproto::peer::{printable, Message, MessageError};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_report(report: &DemoReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for event in &report.events {
                print_json(event);
            }
            print_json(&serde_json::json!({ "dropped": report.dropped }));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PHASE", "KIND", "ID", "DETAIL"]);
            for event in &report.events {
                table.add_row(vec![
                    event.phase.name().to_string(),
                    event.summary.kind.to_string(),
                    format!("{} (0x{:02x})", event.summary.name, event.summary.id),
                    event.summary.detail.clone(),
                ]);
            }
            println!("{table}");
            println!("dropped frames: {}", report.dropped);
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for event in &report.events {
                println!(
                    "[HOST] phase={} {} {}=0x{:02x} {}",
                    event.phase.name(),
                    event.summary.kind,
                    event.summary.name,
                    event.summary.id,
                    event.summary.detail
                );
            }
            println!("[HOST] dropped frames: {}", report.dropped);
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    destination: String,
    source: String,
    ether_type: String,
    payload_size: usize,
    checksum: String,
    valid: bool,
    message: Option<MessageOutput>,
    message_error: Option<String>,
}

#[derive(Serialize)]
struct MessageOutput {
    kind: &'static str,
    id: u8,
    name: &'static str,
    length: u16,
    data: String,
}

pub fn print_frame(frame: &Frame, message: &Result<Message, MessageError>, format: OutputFormat) {
    let out = FrameOutput {
        destination: frame.destination().to_string(),
        source: frame.source().to_string(),
        ether_type: frame.ether_type().to_string(),
        payload_size: frame.payload().len(),
        checksum: format!("0x{:08x}", frame.checksum()),
        valid: frame.is_valid(),
        message: message.as_ref().ok().map(|msg| MessageOutput {
            kind: msg.kind().name(),
            id: msg.id().raw(),
            name: msg.id().name(),
            length: msg.len(),
            data: printable(msg.data()),
        }),
        message_error: message.as_ref().err().map(ToString::to_string),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            table.add_row(vec!["destination", out.destination.as_str()]);
            table.add_row(vec!["source", out.source.as_str()]);
            table.add_row(vec!["type", out.ether_type.as_str()]);
            table.add_row(vec!["payload".to_string(), format!("{} bytes", out.payload_size)]);
            table.add_row(vec!["checksum", out.checksum.as_str()]);
            if let Some(msg) = &out.message {
                table.add_row(vec!["kind".to_string(), msg.kind.to_string()]);
                table.add_row(vec![
                    "identifier".to_string(),
                    format!("{} (0x{:02x})", msg.name, msg.id),
                ]);
                table.add_row(vec!["length".to_string(), msg.length.to_string()]);
                table.add_row(vec!["data".to_string(), msg.data.clone()]);
            }
            if let Some(err) = &out.message_error {
                table.add_row(vec!["message error", err.as_str()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "dst={} src={} type={} payload={} crc={}",
                out.destination, out.source, out.ether_type, out.payload_size, out.checksum
            );
            match (&out.message, &out.message_error) {
                (Some(msg), _) => println!(
                    "message kind={} id={} (0x{:02x}) len={} data={}",
                    msg.kind, msg.name, msg.id, msg.length, msg.data
                ),
                (None, Some(err)) => println!("message error: {err}"),
                (None, None) => {}
            }
        }
        OutputFormat::Raw => print_raw(frame.payload()),
    }
}

#[derive(Serialize)]
struct EncodedOutput {
    size: usize,
    checksum: String,
    frame: String,
}

pub fn print_encoded(frame: &Frame, format: OutputFormat) {
    let wire = frame.to_bytes();
    match format {
        OutputFormat::Json => print_json(&EncodedOutput {
            size: wire.len(),
            checksum: format!("0x{:08x}", frame.checksum()),
            frame: to_hex(&wire),
        }),
        OutputFormat::Raw => print_raw(&wire),
        OutputFormat::Table | OutputFormat::Pretty => println!("{}", to_hex(&wire)),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Parse hex text, ignoring whitespace and `:` separators.
pub fn from_hex(text: &str) -> Result<Vec<u8>, String> {
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).map_err(|err| err.to_string())
}
