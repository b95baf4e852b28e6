//! Fault injection applied to frames between transmission and delivery.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use linkproto_frame::{Frame, Result};

/// A transform applied to each outbound frame before it is queued.
pub trait FrameTransform: Send {
    fn apply(&mut self, frame: &mut Frame) -> Result<()>;
}

/// Flips one random bit of the payload and leaves the checksum stale.
///
/// The receiver always sees the result as a checksum mismatch.
#[derive(Debug)]
pub struct BitFlip {
    rng: StdRng,
}

impl BitFlip {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic corruption for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for BitFlip {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTransform for BitFlip {
    fn apply(&mut self, frame: &mut Frame) -> Result<()> {
        let mut payload = frame.payload().to_vec();
        let byte = self.rng.gen_range(0..payload.len());
        let bit = self.rng.gen_range(0..8u32);
        payload[byte] ^= 1 << bit;
        tracing::trace!(byte, bit, "injecting bit flip");
        frame.set_payload_keep_checksum(payload)
    }
}

#[cfg(test)]
mod tests {
    use linkproto_frame::{Address, EtherType, FrameError};

    use super::*;

    #[test]
    fn bit_flip_changes_exactly_one_bit() {
        let original = vec![0u8; 64];
        let mut frame = Frame::new(
            Address::new([1; 6]),
            Address::new([2; 6]),
            EtherType::Ipv4,
            original.clone(),
        )
        .unwrap();

        BitFlip::seeded(7).apply(&mut frame).unwrap();

        let flipped: u32 = frame
            .payload()
            .iter()
            .zip(&original)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        assert_eq!(flipped, 1);
        assert!(!frame.is_valid());
    }

    #[test]
    fn corrupted_frame_fails_decode_with_checksum_mismatch() {
        let mut flip = BitFlip::seeded(42);
        for _ in 0..50 {
            let mut frame = Frame::new(
                Address::new([0xAA; 6]),
                Address::new([0xBB; 6]),
                EtherType::Arp,
                vec![0x5A; 200],
            )
            .unwrap();
            flip.apply(&mut frame).unwrap();
            assert!(matches!(
                Frame::decode(&frame.to_bytes()),
                Err(FrameError::ChecksumMismatch { .. })
            ));
        }
    }

    #[test]
    fn seeded_flips_are_reproducible() {
        let make = || {
            Frame::new(
                Address::new([1; 6]),
                Address::new([2; 6]),
                EtherType::Ipv4,
                vec![0u8; 46],
            )
            .unwrap()
        };
        let (mut a, mut b) = (make(), make());
        BitFlip::seeded(9).apply(&mut a).unwrap();
        BitFlip::seeded(9).apply(&mut b).unwrap();
        assert_eq!(a, b);
    }
}
