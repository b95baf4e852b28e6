use bytes::{BufMut, Bytes, BytesMut};
use linkproto_frame::PAYLOAD_LEN_MIN;

use crate::error::{MessageError, MessageResult};
use crate::protocol::{CommandId, ErrorCode, Kind, StreamId};

/// Header: kind (1) + identifier (1) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Largest data section a message can describe.
pub const MAX_DATA_LEN: usize = u16::MAX as usize;

/// A message identifier, namespaced by its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    Command(CommandId),
    Response(CommandId),
    Stream(StreamId),
    Error(ErrorCode),
}

impl MessageId {
    /// Rebuild an identifier from its wire parts.
    pub fn from_parts(kind: Kind, raw: u8) -> Self {
        match kind {
            Kind::Command => MessageId::Command(raw.into()),
            Kind::Response => MessageId::Response(raw.into()),
            Kind::Stream => MessageId::Stream(raw.into()),
            Kind::Error => MessageId::Error(raw.into()),
        }
    }

    pub fn kind(self) -> Kind {
        match self {
            MessageId::Command(_) => Kind::Command,
            MessageId::Response(_) => Kind::Response,
            MessageId::Stream(_) => Kind::Stream,
            MessageId::Error(_) => Kind::Error,
        }
    }

    /// Identifier byte as carried on the wire.
    pub fn raw(self) -> u8 {
        match self {
            MessageId::Command(id) | MessageId::Response(id) => id.as_u8(),
            MessageId::Stream(id) => id.as_u8(),
            MessageId::Error(code) => code.as_u8(),
        }
    }

    /// Human-readable identifier name within its namespace.
    pub fn name(self) -> &'static str {
        match self {
            MessageId::Command(id) | MessageId::Response(id) => id.name(),
            MessageId::Stream(id) => id.name(),
            MessageId::Error(code) => code.name(),
        }
    }
}

/// An application message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    data: Bytes,
}

impl Message {
    /// Create a message, rejecting data that the length field cannot describe.
    pub fn new(id: MessageId, data: impl Into<Bytes>) -> MessageResult<Self> {
        let data = data.into();
        check_data_len(data.len())?;
        Ok(Self { id, data })
    }

    pub fn command(id: CommandId, data: impl Into<Bytes>) -> MessageResult<Self> {
        Self::new(MessageId::Command(id), data)
    }

    pub fn response(id: CommandId, data: impl Into<Bytes>) -> MessageResult<Self> {
        Self::new(MessageId::Response(id), data)
    }

    pub fn stream(id: StreamId, data: impl Into<Bytes>) -> MessageResult<Self> {
        Self::new(MessageId::Stream(id), data)
    }

    pub fn error(code: ErrorCode) -> Self {
        Self {
            id: MessageId::Error(code),
            data: Bytes::new(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn kind(&self) -> Kind {
        self.id.kind()
    }

    /// Value of the length field; always equal to `data().len()`.
    pub fn len(&self) -> u16 {
        self.data.len() as u16
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// Encoded size including any padding.
    pub fn wire_size(&self) -> usize {
        (HEADER_SIZE + self.data.len()).max(PAYLOAD_LEN_MIN)
    }

    /// Encode into `dst`.
    ///
    /// Wire format:
    /// ```text
    /// ┌──────────┬────────────┬──────────┬─────────────┬──────────────┐
    /// │ Kind     │ Identifier │ Length   │ Padding     │ Data         │
    /// │ (1B)     │ (1B)       │ (2B LE)  │ (zeroes)    │ (Length B)   │
    /// └──────────┴────────────┴──────────┴─────────────┴──────────────┘
    /// ```
    ///
    /// Padding brings short messages up to the minimum frame payload. It is
    /// not counted in Length; the decoder finds the data at the end of the
    /// buffer instead.
    pub fn encode(&self, dst: &mut BytesMut) {
        let natural = HEADER_SIZE + self.data.len();
        let padding = PAYLOAD_LEN_MIN.saturating_sub(natural);

        dst.reserve(natural + padding);
        dst.put_u8(self.id.kind().as_u8());
        dst.put_u8(self.id.raw());
        dst.put_u16_le(self.len());
        dst.put_bytes(0, padding);
        dst.put_slice(&self.data);
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Decode a message from a (possibly padded) buffer.
    pub fn decode(src: &[u8]) -> MessageResult<Self> {
        if src.len() < HEADER_SIZE {
            return Err(MessageError::TooShort {
                len: src.len(),
                min: HEADER_SIZE,
            });
        }

        let kind = Kind::try_from(src[0]).map_err(MessageError::UnknownKind)?;
        let id = MessageId::from_parts(kind, src[1]);
        let declared = usize::from(u16::from_le_bytes([src[2], src[3]]));

        let available = src.len() - HEADER_SIZE;
        if available < declared {
            return Err(MessageError::LengthExceedsBuffer {
                declared,
                available,
            });
        }

        // Data is anchored to the end of the buffer; anything between the
        // header and the data is padding.
        let data = Bytes::copy_from_slice(&src[src.len() - declared..]);
        Ok(Self { id, data })
    }
}

/// Encode a message from its parts.
pub fn pack(id: MessageId, data: &[u8]) -> MessageResult<Bytes> {
    check_data_len(data.len())?;
    let mut buf = BytesMut::with_capacity((HEADER_SIZE + data.len()).max(PAYLOAD_LEN_MIN));
    Message {
        id,
        data: Bytes::copy_from_slice(data),
    }
    .encode(&mut buf);
    Ok(buf.freeze())
}

/// Decode a message from a buffer produced by [`pack`].
pub fn unpack(src: &[u8]) -> MessageResult<Message> {
    Message::decode(src)
}

fn check_data_len(len: usize) -> MessageResult<()> {
    if len > MAX_DATA_LEN {
        return Err(MessageError::DataTooLarge {
            len,
            max: MAX_DATA_LEN,
        });
    }
    Ok(())
}
