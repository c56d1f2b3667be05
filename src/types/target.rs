//! Target specification parsing and host-list expansion.
//!
//! Supports three grammars, all IPv4:
//! - Single address: `192.168.1.10`
//! - Dash range: `192.168.1.10-192.168.1.40` (or `192.168.1.10-40` within the same /24)
//! - CIDR block: `192.168.1.0/24`, prefix between /24 and /32

use ipnetwork::Ipv4Network;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Ordered list of host addresses produced by [`TargetSpec::expand`].
pub type HostList = Vec<Ipv4Addr>;

/// Error type for target parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("CIDR prefix /{0} is outside the supported range /24-/32")]
    InvalidCidrBits(u32),
    #[error("range too large: {0} addresses (max: {1})")]
    RangeTooLarge(u64, u64),
}

/// A parsed target specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    /// A single IPv4 address.
    Single(Ipv4Addr),
    /// An inclusive address range.
    Range { start: Ipv4Addr, end: Ipv4Addr },
    /// A CIDR network block.
    Cidr(Ipv4Network),
}

impl TargetSpec {
    /// Smallest accepted CIDR prefix.
    pub const MIN_CIDR_BITS: u32 = 24;
    /// Largest accepted CIDR prefix.
    pub const MAX_CIDR_BITS: u32 = 32;
    /// Largest accepted `end - start` distance for a dash range.
    pub const MAX_RANGE_SPAN: u32 = 254;

    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::InvalidFormat("empty target".to_string()));
        }

        if let Some((addr, bits)) = s.split_once('/') {
            let ip = parse_ipv4(addr, s)?;
            let bits: u32 = bits
                .trim()
                .parse()
                .map_err(|_| TargetError::InvalidFormat(s.to_string()))?;
            if !(Self::MIN_CIDR_BITS..=Self::MAX_CIDR_BITS).contains(&bits) {
                return Err(TargetError::InvalidCidrBits(bits));
            }
            let network = Ipv4Network::new(ip, bits as u8)
                .map_err(|_| TargetError::InvalidFormat(s.to_string()))?;
            return Ok(Self::Cidr(network));
        }

        if let Some((start, end)) = s.split_once('-') {
            let start = parse_ipv4(start, s)?;
            let end = end.trim();
            let end = if end.contains('.') {
                parse_ipv4(end, s)?
            } else {
                // Last-octet shorthand: 10.0.0.5-20
                let octet: u8 = end
                    .parse()
                    .map_err(|_| TargetError::InvalidFormat(s.to_string()))?;
                let [a, b, c, _] = start.octets();
                Ipv4Addr::new(a, b, c, octet)
            };

            if end < start {
                return Err(TargetError::InvalidFormat(format!(
                    "{}: range end precedes start",
                    s
                )));
            }

            let span = u32::from(end) - u32::from(start);
            if span > Self::MAX_RANGE_SPAN {
                return Err(TargetError::RangeTooLarge(
                    u64::from(span) + 1,
                    u64::from(Self::MAX_RANGE_SPAN) + 1,
                ));
            }

            return Ok(Self::Range { start, end });
        }

        parse_ipv4(s, s).map(Self::Single)
    }

    /// Expand this specification into an ascending host list.
    ///
    /// CIDR blocks of /30 and wider skip the network and broadcast addresses.
    /// A /31 (point-to-point link) and a /32 (single host) keep every address,
    /// unlike the plain `1..=2^host_bits - 2` host range, which is empty for them.
    pub fn expand(&self) -> HostList {
        match *self {
            Self::Single(ip) => vec![ip],
            Self::Range { start, end } => (u32::from(start)..=u32::from(end))
                .map(Ipv4Addr::from)
                .collect(),
            Self::Cidr(network) => {
                let base = u32::from(network.network());
                let host_bits = 32 - u32::from(network.prefix());
                let size = 1u32 << host_bits;
                let (first, last) = if network.prefix() >= 31 {
                    (0, size - 1)
                } else {
                    (1, size - 2)
                };
                (first..=last).map(|i| Ipv4Addr::from(base + i)).collect()
            }
        }
    }

    /// Number of hosts [`expand`](Self::expand) will produce.
    pub fn host_count(&self) -> usize {
        match *self {
            Self::Single(_) => 1,
            Self::Range { start, end } => (u32::from(end) - u32::from(start)) as usize + 1,
            Self::Cidr(network) => {
                let size = 1usize << (32 - u32::from(network.prefix()));
                if network.prefix() >= 31 {
                    size
                } else {
                    size - 2
                }
            }
        }
    }
}

/// Parse and expand a target string in one step.
pub fn expand(spec: &str) -> Result<HostList, TargetError> {
    TargetSpec::parse(spec).map(|target| target.expand())
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Range { start, end } => write!(f, "{}-{}", start, end),
            Self::Cidr(network) => write!(f, "{}/{}", network.network(), network.prefix()),
        }
    }
}

fn parse_ipv4(addr: &str, original: &str) -> Result<Ipv4Addr, TargetError> {
    addr.trim()
        .parse()
        .map_err(|_| TargetError::InvalidFormat(original.to_string()))
}
