use bytes::Bytes;
use linkproto_transport::Link;
use serde::Serialize;

use crate::error::{PeerError, Result};
use crate::message::{pack, unpack, Message, MessageId};
use crate::protocol::{CommandId, ErrorCode, Role, StreamId};

/// Something the host observed on a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A device answered a command.
    Response { command: CommandId, data: Bytes },
    /// A telemetry sample.
    Telemetry { counter: u32 },
    /// The device reported an error.
    Error { code: ErrorCode, data: Bytes },
}

impl HostEvent {
    /// Flat, serializable view for reporting.
    pub fn summary(&self) -> EventSummary {
        match self {
            HostEvent::Response { command, data } => EventSummary {
                kind: "response",
                id: command.as_u8(),
                name: command.name(),
                detail: printable(data),
            },
            HostEvent::Telemetry { counter } => EventSummary {
                kind: "stream",
                id: StreamId::Telemetry.as_u8(),
                name: StreamId::Telemetry.name(),
                detail: counter.to_string(),
            },
            HostEvent::Error { code, data } => EventSummary {
                kind: "error",
                id: code.as_u8(),
                name: code.name(),
                detail: printable(data),
            },
        }
    }
}

/// Serializable description of a [`HostEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub kind: &'static str,
    pub id: u8,
    pub name: &'static str,
    pub detail: String,
}

/// The host side of the protocol. Issues commands and consumes the
/// device's responses, stream samples and errors.
#[derive(Debug)]
pub struct Host<'a, L: Link> {
    link: &'a L,
}

impl<'a, L: Link> Host<'a, L> {
    pub fn new(link: &'a L) -> Self {
        Self { link }
    }

    /// Pack and transmit a COMMAND message.
    pub fn send_command(&self, command: CommandId, data: &[u8]) -> Result<()> {
        let bytes = pack(MessageId::Command(command), data)?;
        self.link.send(&bytes)?;
        tracing::debug!(%command, len = data.len(), "command sent");
        Ok(())
    }

    /// Receive and handle at most one message.
    ///
    /// Returns `Ok(None)` when nothing is pending. A COMMAND message is a
    /// [`PeerError::ProtocolViolation`].
    pub fn poll(&self) -> Result<Option<HostEvent>> {
        let Some(bytes) = self.link.try_receive()? else {
            return Ok(None);
        };
        let msg = unpack(&bytes)?;
        self.dispatch(msg).map(Some)
    }

    fn dispatch(&self, msg: Message) -> Result<HostEvent> {
        match msg.id() {
            MessageId::Command(_) => Err(PeerError::ProtocolViolation {
                role: Role::Host,
                kind: msg.kind(),
            }),
            MessageId::Response(command) => Ok(self.handle_response(command, msg.into_data())),
            MessageId::Stream(stream) => self.handle_stream(stream, msg.data()),
            MessageId::Error(code) => Ok(self.handle_error(code, msg.into_data())),
        }
    }

    fn handle_response(&self, command: CommandId, data: Bytes) -> HostEvent {
        tracing::info!(
            %command,
            len = data.len(),
            data = %printable(&data),
            "response"
        );
        HostEvent::Response { command, data }
    }

    fn handle_stream(&self, stream: StreamId, data: &[u8]) -> Result<HostEvent> {
        match stream {
            StreamId::Telemetry => {
                let bytes: [u8; 4] = data
                    .try_into()
                    .map_err(|_| PeerError::MalformedTelemetry { len: data.len() })?;
                let counter = u32::from_le_bytes(bytes);
                tracing::info!(counter, "telemetry");
                Ok(HostEvent::Telemetry { counter })
            }
            StreamId::Other(raw) => Err(PeerError::UnknownStream(raw)),
        }
    }

    fn handle_error(&self, code: ErrorCode, data: Bytes) -> HostEvent {
        tracing::warn!(%code, "device reported error");
        HostEvent::Error { code, data }
    }
}

/// Render bytes as text, replacing non-printable bytes with `.`.
pub fn printable(data: &[u8]) -> String {
    data.iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect()
}
