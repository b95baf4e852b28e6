//! Table-driven CRC-32 (IEEE 802.3, reflected polynomial).

/// Reversed CRC-32 polynomial.
pub const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Register value before the first byte is folded in.
pub const INITIAL: u32 = 0xFFFF_FFFF;

/// Value XORed into the register after the last byte.
pub const FINAL_XOR: u32 = 0xFFFF_FFFF;

static TABLE: [u32; 256] = build_table();

/// Build the 256-entry lookup table for [`POLYNOMIAL`].
pub const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                POLYNOMIAL ^ (crc >> 1)
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Compute the CRC-32 of several byte ranges as if they were concatenated.
///
/// Frames checksum their header fields and payload without copying them into
/// one buffer first, so this walks each chunk in order with a single register.
pub fn checksum<'a, I>(chunks: I) -> u32
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut crc = INITIAL;
    for chunk in chunks {
        crc = update(crc, chunk);
    }
    crc ^ FINAL_XOR
}

fn update(mut crc: u32, bytes: &[u8]) -> u32 {
    for &byte in bytes {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ TABLE[index];
    }
    crc
}
