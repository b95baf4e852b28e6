use linkproto_transport::Link;
use serde::Serialize;

use crate::error::{PeerError, Result};
use crate::message::{pack, unpack, Message, MessageId};
use crate::protocol::{CommandId, ErrorCode, Role, StreamId};

/// Payload of a successful PING response.
pub const PONG: &[u8] = b"PONG";

/// Payload of a successful stream start/stop response.
pub const OK: &[u8] = b"OK";

/// Device session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    #[default]
    Idle,
    Streaming,
}

/// The device side of the protocol.
///
/// Answers commands from the host and, while streaming, emits one telemetry
/// message per poll carrying a little-endian `u32` counter.
#[derive(Debug)]
pub struct Device<'a, L: Link> {
    link: &'a L,
    state: DeviceState,
    telemetry: u32,
}

impl<'a, L: Link> Device<'a, L> {
    pub fn new(link: &'a L) -> Self {
        Self {
            link,
            state: DeviceState::Idle,
            telemetry: 0,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.state == DeviceState::Streaming
    }

    /// Counter value carried by the next telemetry message.
    pub fn next_telemetry(&self) -> u32 {
        self.telemetry
    }

    /// Run one poll cycle.
    ///
    /// Handles at most one inbound message, then emits a telemetry message if
    /// streaming. Returns whether an inbound message was handled. Any
    /// non-COMMAND message is a [`PeerError::ProtocolViolation`].
    ///
    /// A streaming device emits its sample even when the inbound frame or
    /// message is rejected; the inbound error is returned afterwards.
    pub fn poll(&mut self) -> Result<bool> {
        let inbound = self.receive();

        if self.is_streaming() {
            self.emit_telemetry()?;
        }

        inbound
    }

    fn receive(&mut self) -> Result<bool> {
        let Some(bytes) = self.link.try_receive()? else {
            return Ok(false);
        };
        let msg = unpack(&bytes)?;
        self.dispatch(msg)?;
        Ok(true)
    }

    /// Send a RESPONSE to `command`.
    pub fn send_response(&self, command: CommandId, data: &[u8]) -> Result<()> {
        self.send(MessageId::Response(command), data)
    }

    /// Send a STREAM message.
    pub fn send_stream(&self, stream: StreamId, data: &[u8]) -> Result<()> {
        self.send(MessageId::Stream(stream), data)
    }

    /// Send an ERROR with no data.
    pub fn send_error(&self, code: ErrorCode) -> Result<()> {
        self.send(MessageId::Error(code), &[])
    }

    fn send(&self, id: MessageId, data: &[u8]) -> Result<()> {
        let bytes = pack(id, data)?;
        self.link.send(&bytes)?;
        Ok(())
    }

    fn dispatch(&mut self, msg: Message) -> Result<()> {
        tracing::debug!(
            kind = %msg.kind(),
            id = msg.id().raw(),
            len = msg.len(),
            "device received message"
        );

        match msg.id() {
            MessageId::Command(command) => self.handle_command(command),
            other => Err(PeerError::ProtocolViolation {
                role: Role::Device,
                kind: other.kind(),
            }),
        }
    }

    fn handle_command(&mut self, command: CommandId) -> Result<()> {
        match command {
            CommandId::Other(raw) => {
                tracing::warn!(command = raw, "unknown command");
                self.send_error(ErrorCode::UnknownCommand)
            }
            CommandId::Ping => self.send_response(command, PONG),
            CommandId::StartStream => {
                self.transition(DeviceState::Streaming);
                self.send_response(command, OK)
            }
            CommandId::StopStream => {
                self.transition(DeviceState::Idle);
                self.send_response(command, OK)
            }
        }
    }

    fn transition(&mut self, next: DeviceState) {
        if self.state != next {
            tracing::info!(from = ?self.state, to = ?next, "device state change");
        }
        self.state = next;
    }

    fn emit_telemetry(&mut self) -> Result<()> {
        let counter = self.telemetry;
        self.send_stream(StreamId::Telemetry, &counter.to_le_bytes())?;
        tracing::trace!(counter, "telemetry sent");
        self.telemetry = counter.wrapping_add(1);
        Ok(())
    }
}
