use std::fmt;

/// Length of a link-layer address in bytes.
pub const ADDRESS_LEN: usize = 6;

/// A 6-byte link-layer address. Equality is byte-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Create an address from raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    pub const fn octets(&self) -> [u8; ADDRESS_LEN] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; ADDRESS_LEN] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Error returned when parsing an address from text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address '{0}' (expected six hex octets, e.g. 00:11:22:33:44:55)")]
pub struct ParseAddressError(pub String);

impl std::str::FromStr for Address {
    type Err = ParseAddressError;

    /// Accepts `:` or `-` separated hex octets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; ADDRESS_LEN];
        let mut parts = s.split([':', '-']);
        for slot in bytes.iter_mut() {
            let part = parts
                .next()
                .filter(|p| p.len() == 2)
                .ok_or_else(|| ParseAddressError(s.to_string()))?;
            *slot = u8::from_str_radix(part, 16).map_err(|_| ParseAddressError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseAddressError(s.to_string()));
        }
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse() {
        let addr = Address::new([0x00, 0x11, 0x22, 0xAA, 0xBB, 0xFF]);
        let text = addr.to_string();
        assert_eq!(text, "00:11:22:aa:bb:ff");
        assert_eq!(text.parse::<Address>().unwrap(), addr);
        assert_eq!("00-11-22-AA-BB-FF".parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("00:11:22:33:44".parse::<Address>().is_err());
        assert!("00:11:22:33:44:55:66".parse::<Address>().is_err());
        assert!("00:11:22:33:44:zz".parse::<Address>().is_err());
        assert!("0:11:22:33:44:55".parse::<Address>().is_err());
    }
}
