use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use linkproto_frame::{Address, EtherType, Frame};

use crate::error::{Result, TransportError};
use crate::fault::FrameTransform;
use crate::traits::Link;

type Queue = Arc<Mutex<VecDeque<Bytes>>>;

/// Configuration for a loopback endpoint.
#[derive(Debug, Clone, Default)]
pub struct LinkConfig {
    /// Type tag stamped on every outbound frame. Default: IPv4.
    pub ether_type: EtherType,
}

/// One end of an in-memory point-to-point link.
///
/// Each direction is a FIFO of encoded frames guarded by its own mutex, so a
/// send from one endpoint is visible to the other's next `try_receive`.
/// The two directions are independent.
pub struct LoopbackLink {
    address: Address,
    peer_address: Address,
    rx: Queue,
    tx: Queue,
    config: LinkConfig,
    fault: Mutex<Option<Box<dyn FrameTransform>>>,
}

/// Create two linked endpoints with default configuration.
pub fn pair(a: Address, b: Address) -> (LoopbackLink, LoopbackLink) {
    pair_with_config(a, b, LinkConfig::default())
}

/// Create two linked endpoints sharing the given configuration.
pub fn pair_with_config(
    a: Address,
    b: Address,
    config: LinkConfig,
) -> (LoopbackLink, LoopbackLink) {
    let a_to_b: Queue = Arc::default();
    let b_to_a: Queue = Arc::default();

    let left = LoopbackLink {
        address: a,
        peer_address: b,
        rx: Arc::clone(&b_to_a),
        tx: Arc::clone(&a_to_b),
        config: config.clone(),
        fault: Mutex::new(None),
    };
    let right = LoopbackLink {
        address: b,
        peer_address: a,
        rx: a_to_b,
        tx: b_to_a,
        config,
        fault: Mutex::new(None),
    };
    (left, right)
}

impl LoopbackLink {
    /// This endpoint's own address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The address outbound frames are sent to.
    pub fn peer_address(&self) -> Address {
        self.peer_address
    }

    /// Current endpoint configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// True if the peer has queued at least one frame for this endpoint.
    pub fn has_pending(&self) -> bool {
        self.pending() > 0
    }

    /// Number of frames waiting to be received.
    pub fn pending(&self) -> usize {
        self.rx.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Install (or remove) a transform applied to every outbound frame.
    pub fn set_fault_injection(&self, transform: Option<Box<dyn FrameTransform>>) -> Result<()> {
        if transform.is_some() {
            tracing::warn!(address = %self.address, "fault injection enabled on outbound frames");
        }
        *self.fault.lock().map_err(|_| TransportError::Poisoned)? = transform;
        Ok(())
    }

    /// Send a payload with an explicit type tag.
    pub fn send_typed(&self, payload: &[u8], ether_type: EtherType) -> Result<()> {
        let mut frame = Frame::new(
            self.peer_address,
            self.address,
            ether_type,
            Bytes::copy_from_slice(payload),
        )?;

        if let Some(transform) = self
            .fault
            .lock()
            .map_err(|_| TransportError::Poisoned)?
            .as_mut()
        {
            transform.apply(&mut frame)?;
        }

        let wire = frame.to_bytes();
        tracing::debug!(
            src = %self.address,
            dst = %self.peer_address,
            size = wire.len(),
            "frame sent"
        );
        self.tx
            .lock()
            .map_err(|_| TransportError::Poisoned)?
            .push_back(wire);
        Ok(())
    }
}

impl Link for LoopbackLink {
    fn send(&self, payload: &[u8]) -> Result<()> {
        self.send_typed(payload, self.config.ether_type)
    }

    fn try_receive(&self) -> Result<Option<Bytes>> {
        let wire = {
            let mut rx = self.rx.lock().map_err(|_| TransportError::Poisoned)?;
            match rx.pop_front() {
                Some(wire) => wire,
                None => return Ok(None),
            }
        };

        let frame = Frame::decode(&wire)?;
        if frame.destination() != self.address {
            return Err(TransportError::MisaddressedFrame {
                expected: self.address,
                actual: frame.destination(),
            });
        }

        tracing::debug!(
            src = %frame.source(),
            dst = %frame.destination(),
            ether_type = %frame.ether_type(),
            size = wire.len(),
            "frame received"
        );
        Ok(Some(frame.into_payload()))
    }
}

impl fmt::Debug for LoopbackLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fault = self
            .fault
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("LoopbackLink")
            .field("address", &self.address)
            .field("peer_address", &self.peer_address)
            .field("config", &self.config)
            .field("fault_injection", &fault)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use linkproto_frame::{FrameError, PAYLOAD_LEN_MAX, PAYLOAD_LEN_MIN};

    use super::*;
    use crate::fault::BitFlip;

    const MAC_A: Address = Address::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    const MAC_B: Address = Address::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

    #[test]
    fn roundtrip_min_payload() {
        let (host, dev) = pair(MAC_A, MAC_B);
        let tx = vec![0x42; PAYLOAD_LEN_MIN];
        host.send(&tx).unwrap();

        assert!(dev.has_pending());
        let rx = dev.try_receive().unwrap().expect("frame should be pending");
        assert_eq!(rx.as_ref(), tx.as_slice());
        assert!(!dev.has_pending());
    }

    #[test]
    fn try_receive_returns_none_when_empty() {
        let (a, _b) = pair(MAC_A, MAC_B);
        assert!(a.try_receive().unwrap().is_none());
    }

    #[test]
    fn directions_are_independent() {
        let (a, b) = pair(MAC_A, MAC_B);
        a.send(&[1u8; 50]).unwrap();
        b.send(&[2u8; 60]).unwrap();

        assert_eq!(a.pending(), 1);
        assert_eq!(b.pending(), 1);
        assert_eq!(b.try_receive().unwrap().unwrap().as_ref(), &[1u8; 50]);
        assert_eq!(a.try_receive().unwrap().unwrap().as_ref(), &[2u8; 60]);
    }

    #[test]
    fn frames_are_delivered_in_order() {
        let (a, b) = pair(MAC_A, MAC_B);
        for i in 0..10u8 {
            a.send(&[i; 46]).unwrap();
        }
        for i in 0..10u8 {
            assert_eq!(b.try_receive().unwrap().unwrap()[0], i);
        }
    }

    #[test]
    fn payload_size_bounds_enforced() {
        let (a, b) = pair(MAC_A, MAC_B);

        let err = a.send(&vec![0u8; PAYLOAD_LEN_MIN - 1]).unwrap_err();
        assert!(matches!(
            err,
            TransportError::Frame(FrameError::PayloadOutOfBounds { .. })
        ));

        let err = a.send(&vec![0u8; PAYLOAD_LEN_MAX + 1]).unwrap_err();
        assert!(matches!(
            err,
            TransportError::Frame(FrameError::PayloadOutOfBounds { .. })
        ));
        assert!(!b.has_pending());
    }

    #[test]
    fn error_injection_surfaces_as_checksum_mismatch() {
        let (a, b) = pair(MAC_A, MAC_B);
        a.set_fault_injection(Some(Box::new(BitFlip::seeded(1)))).unwrap();
        a.send(&[0xAA; PAYLOAD_LEN_MIN]).unwrap();

        let err = b.try_receive().unwrap_err();
        assert!(matches!(
            err,
            TransportError::Frame(FrameError::ChecksumMismatch { .. })
        ));
        // The bad frame is consumed.
        assert!(!b.has_pending());

        a.set_fault_injection(None).unwrap();
        a.send(&[0xAA; PAYLOAD_LEN_MIN]).unwrap();
        assert!(b.try_receive().unwrap().is_some());
    }

    #[test]
    fn misaddressed_frame_rejected() {
        let (c, d) = pair(MAC_A, Address::new([0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01]));

        // A receiver with a different address reading d's inbound queue.
        let stranger = LoopbackLink {
            address: MAC_B,
            peer_address: MAC_A,
            rx: Arc::clone(&d.rx),
            tx: Arc::clone(&d.tx),
            config: LinkConfig::default(),
            fault: Mutex::new(None),
        };
        c.send(&[0u8; 46]).unwrap();

        let err = stranger.try_receive().unwrap_err();
        assert!(matches!(
            err,
            TransportError::MisaddressedFrame { expected, .. } if expected == MAC_B
        ));
        assert!(!d.has_pending());
    }

    #[test]
    fn send_typed_stamps_ether_type() {
        let (a, b) = pair(MAC_A, MAC_B);
        a.send_typed(&[0u8; 46], EtherType::Arp).unwrap();

        let wire = b.rx.lock().unwrap().front().cloned().unwrap();
        assert_eq!(&wire[12..14], &[0x08, 0x06]);
        assert!(b.try_receive().unwrap().is_some());
    }

    #[test]
    fn configured_ether_type_used_by_send() {
        let (a, b) = pair_with_config(
            MAC_A,
            MAC_B,
            LinkConfig {
                ether_type: EtherType::Ipv6,
            },
        );
        a.send(&[0u8; 46]).unwrap();
        let wire = b.rx.lock().unwrap().front().cloned().unwrap();
        assert_eq!(&wire[12..14], &[0x86, 0xDD]);
    }

    #[test]
    fn addresses_are_exchanged() {
        let (a, b) = pair(MAC_A, MAC_B);
        assert_eq!(a.address(), MAC_A);
        assert_eq!(a.peer_address(), MAC_B);
        assert_eq!(b.address(), MAC_B);
        assert_eq!(b.peer_address(), MAC_A);
    }

    #[test]
    fn concurrent_sender_and_receiver() {
        let (a, b) = pair(MAC_A, MAC_B);
        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..200u32 {
                    let mut payload = vec![0u8; 46];
                    payload[..4].copy_from_slice(&i.to_le_bytes());
                    a.send(&payload).unwrap();
                }
            });

            let mut next = 0u32;
            while next < 200 {
                if let Some(payload) = b.try_receive().unwrap() {
                    let got = u32::from_le_bytes(payload[..4].try_into().unwrap());
                    assert_eq!(got, next);
                    next += 1;
                } else {
                    std::thread::yield_now();
                }
            }
        });
    }
}
