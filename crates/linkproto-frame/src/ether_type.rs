use std::fmt;

/// Link-layer payload type tag, carried big-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum EtherType {
    #[default]
    Ipv4 = 0x0800,
    Arp = 0x0806,
    Ipv6 = 0x86DD,
}

impl EtherType {
    /// Numeric tag value.
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Tag bytes in wire (network) order.
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.as_u16().to_be_bytes()
    }

    pub const fn name(self) -> &'static str {
        match self {
            EtherType::Ipv4 => "IPV4",
            EtherType::Arp => "ARP",
            EtherType::Ipv6 => "IPV6",
        }
    }
}

impl TryFrom<u16> for EtherType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0800 => Ok(EtherType::Ipv4),
            0x0806 => Ok(EtherType::Arp),
            0x86DD => Ok(EtherType::Ipv6),
            other => Err(other),
        }
    }
}

impl From<EtherType> for u16 {
    fn from(ty: EtherType) -> Self {
        ty.as_u16()
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04x})", self.name(), self.as_u16())
    }
}

impl std::str::FromStr for EtherType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ipv4" => Ok(EtherType::Ipv4),
            "ipv6" => Ok(EtherType::Ipv6),
            "arp" => Ok(EtherType::Arp),
            _ => Err(format!("unknown ether type '{s}' (expected ipv4, ipv6 or arp)")),
        }
    }
}
