use bytes::{BufMut, Bytes, BytesMut};

use crate::address::{Address, ADDRESS_LEN};
use crate::crc;
use crate::error::{FrameError, Result};
use crate::ether_type::EtherType;

/// Header: destination (6) + source (6) + type (2) = 14 bytes.
pub const HEADER_SIZE: usize = 2 * ADDRESS_LEN + TYPE_LEN;

/// Trailing checksum size.
pub const CHECKSUM_SIZE: usize = 4;

/// Smallest payload a frame may carry.
pub const PAYLOAD_LEN_MIN: usize = 46;

/// Largest payload a frame may carry.
pub const PAYLOAD_LEN_MAX: usize = 1500;

/// Smallest encoded frame: header + minimum payload + checksum.
pub const FRAME_LEN_MIN: usize = HEADER_SIZE + PAYLOAD_LEN_MIN + CHECKSUM_SIZE;

/// Largest encoded frame: header + maximum payload + checksum.
pub const FRAME_LEN_MAX: usize = HEADER_SIZE + PAYLOAD_LEN_MAX + CHECKSUM_SIZE;

const TYPE_LEN: usize = 2;

/// A link-layer frame.
///
/// The checksum always covers the current destination, source, type and
/// payload. Every mutator recomputes it, apart from
/// [`Frame::set_payload_keep_checksum`], which exists so that a deliberately
/// invalid frame can be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    destination: Address,
    source: Address,
    ether_type: EtherType,
    payload: Bytes,
    checksum: u32,
}

impl Frame {
    /// Build a frame from explicit fields and compute its checksum.
    pub fn new(
        destination: Address,
        source: Address,
        ether_type: EtherType,
        payload: impl Into<Bytes>,
    ) -> Result<Self> {
        let payload = payload.into();
        check_payload_len(payload.len())?;

        let mut frame = Self {
            destination,
            source,
            ether_type,
            payload,
            checksum: 0,
        };
        frame.checksum = frame.compute_checksum();
        Ok(frame)
    }

    /// Decode and validate a frame from its wire bytes.
    ///
    /// The payload length is implied by the buffer length; the transport is
    /// expected to delimit frames. The checksum is verified before the type
    /// tag is interpreted, so any corruption of the covered bytes reports
    /// [`FrameError::ChecksumMismatch`].
    pub fn decode(src: &[u8]) -> Result<Self> {
        if src.len() < FRAME_LEN_MIN {
            return Err(FrameError::TooShort {
                len: src.len(),
                min: FRAME_LEN_MIN,
            });
        }
        if src.len() > FRAME_LEN_MAX {
            return Err(FrameError::TooLong {
                len: src.len(),
                max: FRAME_LEN_MAX,
            });
        }

        let (header, rest) = src.split_at(HEADER_SIZE);
        let (payload, trailer) = rest.split_at(rest.len() - CHECKSUM_SIZE);

        let mut destination = [0u8; ADDRESS_LEN];
        destination.copy_from_slice(&header[..ADDRESS_LEN]);
        let mut source = [0u8; ADDRESS_LEN];
        source.copy_from_slice(&header[ADDRESS_LEN..2 * ADDRESS_LEN]);
        let type_bytes = [header[2 * ADDRESS_LEN], header[2 * ADDRESS_LEN + 1]];

        let carried = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        let computed = crc::checksum([
            destination.as_slice(),
            source.as_slice(),
            type_bytes.as_slice(),
            payload,
        ]);
        if carried != computed {
            return Err(FrameError::ChecksumMismatch {
                expected: computed,
                actual: carried,
            });
        }

        let raw_type = u16::from_be_bytes(type_bytes);
        let ether_type = EtherType::try_from(raw_type).map_err(FrameError::UnknownEtherType)?;

        Ok(Self {
            destination: Address::new(destination),
            source: Address::new(source),
            ether_type,
            payload: Bytes::copy_from_slice(payload),
            checksum: carried,
        })
    }

    /// Encode the frame into its wire format.
    ///
    /// Wire format:
    /// ```text
    /// ┌─────────────┬─────────────┬──────────┬────────────────┬──────────┐
    /// │ Destination │ Source      │ Type     │ Payload        │ CRC-32   │
    /// │ (6B)        │ (6B)        │ (2B BE)  │ (46..=1500B)   │ (4B LE)  │
    /// └─────────────┴─────────────┴──────────┴────────────────┴──────────┘
    /// ```
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_size());
        dst.put_slice(self.destination.as_bytes());
        dst.put_slice(self.source.as_bytes());
        dst.put_u16(self.ether_type.as_u16());
        dst.put_slice(&self.payload);
        dst.put_u32_le(self.checksum);
    }

    /// Encode the frame into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        self.encode(&mut buf);
        buf.freeze()
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + CHECKSUM_SIZE
    }

    /// True when the stored checksum matches the frame contents.
    pub fn is_valid(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    pub fn destination(&self) -> Address {
        self.destination
    }

    pub fn source(&self) -> Address {
        self.source
    }

    pub fn ether_type(&self) -> EtherType {
        self.ether_type
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Consume the frame, returning its payload.
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    pub fn set_destination(&mut self, destination: Address) {
        self.destination = destination;
        self.refresh_checksum();
    }

    pub fn set_source(&mut self, source: Address) {
        self.source = source;
        self.refresh_checksum();
    }

    pub fn set_ether_type(&mut self, ether_type: EtherType) {
        self.ether_type = ether_type;
        self.refresh_checksum();
    }

    /// Replace the payload and recompute the checksum.
    pub fn set_payload(&mut self, payload: impl Into<Bytes>) -> Result<()> {
        self.replace_payload(payload.into())?;
        self.refresh_checksum();
        Ok(())
    }

    /// Replace the payload without touching the stored checksum.
    ///
    /// Unless the new payload checksums identically, the frame is invalid
    /// afterwards. Only fault injection should need this.
    pub fn set_payload_keep_checksum(&mut self, payload: impl Into<Bytes>) -> Result<()> {
        self.replace_payload(payload.into())
    }

    fn replace_payload(&mut self, payload: Bytes) -> Result<()> {
        check_payload_len(payload.len())?;
        self.payload = payload;
        Ok(())
    }

    fn refresh_checksum(&mut self) {
        self.checksum = self.compute_checksum();
    }

    fn compute_checksum(&self) -> u32 {
        let type_bytes = self.ether_type.to_be_bytes();
        crc::checksum([
            self.destination.as_bytes(),
            self.source.as_bytes(),
            type_bytes.as_slice(),
            self.payload.as_ref(),
        ])
    }
}

impl Default for Frame {
    /// Zero addresses, IPv4, and a minimum-size zero payload.
    fn default() -> Self {
        let mut frame = Self {
            destination: Address::default(),
            source: Address::default(),
            ether_type: EtherType::default(),
            payload: Bytes::from(vec![0u8; PAYLOAD_LEN_MIN]),
            checksum: 0,
        };
        frame.refresh_checksum();
        frame
    }
}

/// Check a payload length against the frame bounds.
pub fn check_payload_len(len: usize) -> Result<()> {
    if !(PAYLOAD_LEN_MIN..=PAYLOAD_LEN_MAX).contains(&len) {
        return Err(FrameError::PayloadOutOfBounds {
            len,
            min: PAYLOAD_LEN_MIN,
            max: PAYLOAD_LEN_MAX,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    const MAC_A: Address = Address::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    const MAC_B: Address = Address::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| i as u8).collect()
    }

    #[test]
    fn roundtrip_minimum_payload() {
        let frame = Frame::new(MAC_A, MAC_B, EtherType::Ipv4, vec![0x42; PAYLOAD_LEN_MIN]).unwrap();
        let wire = frame.to_bytes();
        assert_eq!(wire.len(), FRAME_LEN_MIN);

        let decoded = Frame::decode(&wire).unwrap();
        assert_eq!(decoded, frame);
        assert!(decoded.is_valid());
    }

    #[test]
    fn roundtrip_variable_payload_sizes() {
        for size in [46, 47, 128, 512, 1499, 1500] {
            for ether_type in [EtherType::Ipv4, EtherType::Ipv6, EtherType::Arp] {
                let frame = Frame::new(MAC_B, MAC_A, ether_type, pattern(size)).unwrap();
                let decoded = Frame::decode(&frame.to_bytes()).unwrap();
                assert_eq!(decoded, frame, "payload={size} type={ether_type}");
                assert!(decoded.is_valid());
            }
        }
    }

    #[test]
    fn wire_layout() {
        let payload = pattern(PAYLOAD_LEN_MIN);
        let frame = Frame::new(MAC_A, MAC_B, EtherType::Ipv6, payload.clone()).unwrap();
        let wire = frame.to_bytes();

        assert_eq!(&wire[0..6], MAC_A.as_bytes());
        assert_eq!(&wire[6..12], MAC_B.as_bytes());
        assert_eq!(&wire[12..14], &[0x86, 0xDD]);
        assert_eq!(&wire[14..14 + payload.len()], payload.as_slice());
        assert_eq!(&wire[wire.len() - 4..], &frame.checksum().to_le_bytes());
    }

    #[test]
    fn checksum_covers_concatenated_fields() {
        let payload = pattern(100);
        let frame = Frame::new(MAC_A, MAC_B, EtherType::Arp, payload.clone()).unwrap();

        let mut flat = Vec::new();
        flat.extend_from_slice(MAC_A.as_bytes());
        flat.extend_from_slice(MAC_B.as_bytes());
        flat.extend_from_slice(&[0x08, 0x06]);
        flat.extend_from_slice(&payload);
        assert_eq!(frame.checksum(), crc::checksum([flat.as_slice()]));
    }

    #[test]
    fn type_tag_is_byte_swapped_on_decode() {
        // 0x0800 on the wire must come back as IPv4, not 0x0008.
        let frame = Frame::new(MAC_A, MAC_B, EtherType::Ipv4, pattern(60)).unwrap();
        let wire = frame.to_bytes();
        assert_eq!(&wire[12..14], &[0x08, 0x00]);
        assert_eq!(Frame::decode(&wire).unwrap().ether_type(), EtherType::Ipv4);
    }

    #[test]
    fn serialized_length() {
        let frame = Frame::new(MAC_A, MAC_B, EtherType::Ipv4, vec![0u8; 100]).unwrap();
        assert_eq!(frame.to_bytes().len(), 2 * ADDRESS_LEN + 2 + 100 + 4);
        assert_eq!(frame.wire_size(), 118);
    }

    #[test]
    fn payload_bounds_on_construction() {
        let err = Frame::new(MAC_A, MAC_B, EtherType::Ipv4, vec![0u8; 45]).unwrap_err();
        assert!(matches!(err, FrameError::PayloadOutOfBounds { len: 45, .. }));

        let err = Frame::new(MAC_A, MAC_B, EtherType::Ipv4, vec![0u8; 1501]).unwrap_err();
        assert!(matches!(err, FrameError::PayloadOutOfBounds { len: 1501, .. }));

        assert!(Frame::new(MAC_A, MAC_B, EtherType::Ipv4, vec![0u8; 46]).is_ok());
        assert!(Frame::new(MAC_A, MAC_B, EtherType::Ipv4, vec![0u8; 1500]).is_ok());
    }

    #[test]
    fn decode_rejects_short_and_long_buffers() {
        let err = Frame::decode(&[0u8; FRAME_LEN_MIN - 1]).unwrap_err();
        assert_eq!(
            err,
            FrameError::TooShort {
                len: 63,
                min: 64
            }
        );

        let err = Frame::decode(&vec![0u8; FRAME_LEN_MAX + 1]).unwrap_err();
        assert_eq!(
            err,
            FrameError::TooLong {
                len: 1519,
                max: 1518
            }
        );
    }

    #[test]
    fn decode_detects_payload_corruption() {
        let frame = Frame::new(MAC_A, MAC_B, EtherType::Arp, vec![0u8; PAYLOAD_LEN_MIN]).unwrap();
        let mut wire = frame.to_bytes().to_vec();
        wire[HEADER_SIZE + 3] ^= 0x01;

        let err = Frame::decode(&wire).unwrap_err();
        assert!(matches!(err, FrameError::ChecksumMismatch { .. }));
    }

    #[test]
    fn any_single_bit_flip_is_detected() {
        let frame = Frame::new(MAC_A, MAC_B, EtherType::Ipv4, pattern(64)).unwrap();
        let wire = frame.to_bytes();
        let covered = wire.len() - CHECKSUM_SIZE;

        for byte in 0..covered {
            for bit in 0..8 {
                let mut corrupted = wire.to_vec();
                corrupted[byte] ^= 1 << bit;
                let err = Frame::decode(&corrupted).unwrap_err();
                assert!(
                    matches!(err, FrameError::ChecksumMismatch { .. }),
                    "byte {byte} bit {bit}: {err:?}"
                );
            }
        }
    }

    #[test]
    fn random_bit_flips_in_large_frames_are_detected() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        for _ in 0..200 {
            let len = rng.gen_range(PAYLOAD_LEN_MIN..=PAYLOAD_LEN_MAX);
            let payload: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let frame = Frame::new(MAC_B, MAC_A, EtherType::Ipv6, payload).unwrap();
            let mut wire = frame.to_bytes().to_vec();

            let byte = rng.gen_range(0..wire.len() - CHECKSUM_SIZE);
            wire[byte] ^= 1 << rng.gen_range(0..8);
            assert!(matches!(
                Frame::decode(&wire),
                Err(FrameError::ChecksumMismatch { .. })
            ));
        }
    }

    #[test]
    fn decode_rejects_unknown_type_with_valid_checksum() {
        let payload = pattern(PAYLOAD_LEN_MIN);
        let type_bytes = [0x12u8, 0x34];
        let crc = crc::checksum([
            MAC_A.as_bytes(),
            MAC_B.as_bytes(),
            type_bytes.as_slice(),
            payload.as_slice(),
        ]);

        let mut wire = BytesMut::new();
        wire.put_slice(MAC_A.as_bytes());
        wire.put_slice(MAC_B.as_bytes());
        wire.put_slice(&type_bytes);
        wire.put_slice(&payload);
        wire.put_u32_le(crc);

        assert_eq!(
            Frame::decode(&wire).unwrap_err(),
            FrameError::UnknownEtherType(0x1234)
        );
    }

    #[test]
    fn mutators_preserve_validity() {
        let mut frame =
            Frame::new(MAC_A, MAC_B, EtherType::Ipv4, vec![0xFF; PAYLOAD_LEN_MIN]).unwrap();
        let before = frame.checksum();

        frame.set_destination(MAC_B);
        assert!(frame.is_valid());
        frame.set_source(MAC_A);
        assert!(frame.is_valid());
        frame.set_ether_type(EtherType::Ipv6);
        assert!(frame.is_valid());
        frame.set_payload(vec![0xAA; 128]).unwrap();
        assert!(frame.is_valid());

        assert_ne!(frame.checksum(), before);
        assert_eq!(Frame::decode(&frame.to_bytes()).unwrap(), frame);
    }

    #[test]
    fn set_payload_enforces_bounds_and_leaves_frame_unchanged() {
        let mut frame = Frame::new(MAC_A, MAC_B, EtherType::Ipv4, pattern(50)).unwrap();
        let snapshot = frame.clone();

        assert!(frame.set_payload(vec![0u8; 45]).is_err());
        assert!(frame.set_payload(vec![0u8; 1501]).is_err());
        assert!(frame.set_payload_keep_checksum(vec![0u8; 10]).is_err());
        assert_eq!(frame, snapshot);
    }

    #[test]
    fn keep_checksum_produces_invalid_frame() {
        let mut frame = Frame::new(MAC_A, MAC_B, EtherType::Ipv4, vec![0u8; 60]).unwrap();
        let checksum = frame.checksum();

        frame.set_payload_keep_checksum(vec![1u8; 60]).unwrap();
        assert_eq!(frame.checksum(), checksum);
        assert!(!frame.is_valid());
        assert!(matches!(
            Frame::decode(&frame.to_bytes()),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn default_frame_is_valid() {
        let frame = Frame::default();
        assert!(frame.is_valid());
        assert_eq!(frame.payload().len(), PAYLOAD_LEN_MIN);
        assert_eq!(Frame::decode(&frame.to_bytes()).unwrap(), frame);
    }

    #[test]
    fn encode_appends_to_existing_buffer() {
        let frame = Frame::new(MAC_A, MAC_B, EtherType::Ipv4, pattern(46)).unwrap();
        let mut buf = BytesMut::from(&b"xx"[..]);
        frame.encode(&mut buf);
        assert_eq!(buf.len(), 2 + FRAME_LEN_MIN);
        assert_eq!(Frame::decode(&buf[2..]).unwrap(), frame);
    }
}
