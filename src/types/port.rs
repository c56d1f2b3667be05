//! Port types, presets and custom port-list parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortList` resolves a preset name or a custom spec such as `"22,80,8000-8010"`
//! into a bounded, deduplicated list that keeps first-seen order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(u32::from(value)))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port token: '{0}'")]
    InvalidPortToken(String),
    #[error("preset 'custom' requires a 'ports' list")]
    MissingCustomPorts,
    #[error("no valid ports in specification")]
    Empty,
}

/// Named port presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PortPreset {
    /// Frequently exposed services
    #[default]
    Common,
    /// HTTP(S) and common alternates
    Web,
    /// Database servers and caches
    Database,
    /// Extended list of well-known ports
    #[value(alias = "extended")]
    #[serde(alias = "extended")]
    All,
    /// User-supplied port list
    Custom,
}

const COMMON_PORTS: &[u16] = &[
    21, 22, 23, 25, 53, 80, 110, 135, 139, 143, 443, 445, 993, 995, 1433, 3306, 3389, 5432,
    5900, 8080,
];

const WEB_PORTS: &[u16] = &[80, 443, 8080, 8443];

const DATABASE_PORTS: &[u16] = &[1433, 1521, 3306, 5432, 5984, 6379, 9042, 9200, 11211, 27017];

const EXTENDED_PORTS: &[u16] = &[
    7, 9, 13, 21, 22, 23, 25, 26, 37, 53, 79, 80, 81, 88, 106, 110, 111, 113, 119, 135, 139,
    143, 144, 179, 199, 389, 427, 443, 444, 445, 465, 513, 514, 515, 543, 544, 548, 554, 587,
    631, 646, 873, 990, 993, 995, 1025, 1026, 1027, 1028, 1029, 1110, 1433, 1720, 1723, 1755,
    1900, 2000, 2001, 2049, 2121, 2717, 3000, 3128, 3306, 3389, 3986, 4899, 5000, 5009, 5051,
    5060, 5101, 5190, 5357, 5432, 5631, 5666, 5800, 5900, 6000, 6001, 6646, 7070, 8000, 8008,
    8009, 8080, 8081, 8443, 8888, 9100, 9999, 10000, 32768, 49152, 49153, 49154, 49155, 49156,
    49157,
];

impl PortPreset {
    /// Look up a preset by name, falling back to `Common` for unknown or absent names.
    pub fn from_name(name: Option<&str>) -> Self {
        name.and_then(|n| n.parse().ok()).unwrap_or_default()
    }

    /// Fixed port list of this preset. Empty for `Custom`.
    pub fn ports(self) -> &'static [u16] {
        match self {
            Self::Common => COMMON_PORTS,
            Self::Web => WEB_PORTS,
            Self::Database => DATABASE_PORTS,
            Self::All => EXTENDED_PORTS,
            Self::Custom => &[],
        }
    }
}

impl FromStr for PortPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "common" => Ok(Self::Common),
            "web" => Ok(Self::Web),
            "database" => Ok(Self::Database),
            "all" | "extended" => Ok(Self::All),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("unknown port preset: {}", s)),
        }
    }
}

impl fmt::Display for PortPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Common => write!(f, "common"),
            Self::Web => write!(f, "web"),
            Self::Database => write!(f, "database"),
            Self::All => write!(f, "all"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Ordered set of unique ports, bounded to [`PortList::MAX_PORTS`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PortList(Vec<Port>);

impl PortList {
    /// Maximum number of ports in one list.
    pub const MAX_PORTS: usize = 100;

    /// Resolve a preset name and optional custom spec into a port list.
    ///
    /// An absent or unknown preset means `common`. The custom spec is only
    /// consulted for the `custom` preset.
    pub fn resolve(preset: Option<&str>, custom: Option<&str>) -> Result<Self, PortError> {
        match PortPreset::from_name(preset) {
            PortPreset::Custom => {
                let custom = custom
                    .filter(|c| !c.trim().is_empty())
                    .ok_or(PortError::MissingCustomPorts)?;
                Self::parse_custom(custom)
            }
            preset => Ok(Self::from_preset(preset)),
        }
    }

    /// Port list of a fixed preset.
    pub fn from_preset(preset: PortPreset) -> Self {
        Self(preset.ports().iter().filter_map(|&p| Port::new(p)).collect())
    }

    /// Parse a comma-separated list of ports and `low-high` ranges.
    ///
    /// Values outside 1-65535 are dropped rather than rejected, and a range
    /// whose low end exceeds its high end contributes nothing. Collection
    /// stops once [`MAX_PORTS`](Self::MAX_PORTS) unique ports are gathered.
    pub fn parse_custom(spec: &str) -> Result<Self, PortError> {
        let mut collector = Collector::default();

        for token in spec.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            if let Some((low, high)) = token.split_once('-') {
                let low = parse_number(low, token)?;
                let high = parse_number(high, token)?;
                // Clamp so an oversized range never walks past 65535.
                let high = high.min(u32::from(Port::MAX));
                for value in low..=high {
                    if collector.push(value) {
                        break;
                    }
                }
            } else {
                collector.push(parse_number(token, token)?);
            }

            if collector.is_full() {
                break;
            }
        }

        if collector.ports.is_empty() {
            return Err(PortError::Empty);
        }
        Ok(Self(collector.ports))
    }

    /// Ports in list order.
    pub fn as_slice(&self) -> &[Port] {
        &self.0
    }

    /// Raw port numbers in list order.
    pub fn to_u16s(&self) -> Vec<u16> {
        self.0.iter().map(|p| p.as_u16()).collect()
    }

    /// Number of ports.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for PortList {
    type Item = Port;
    type IntoIter = std::vec::IntoIter<Port>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[derive(Default)]
struct Collector {
    ports: Vec<Port>,
    seen: HashSet<u16>,
}

impl Collector {
    /// Push a candidate value. Returns true once the list is full.
    fn push(&mut self, value: u32) -> bool {
        if self.is_full() {
            return true;
        }
        if let Some(port) = u16::try_from(value).ok().and_then(Port::new) {
            if self.seen.insert(port.as_u16()) {
                self.ports.push(port);
            }
        }
        self.is_full()
    }

    fn is_full(&self) -> bool {
        self.ports.len() >= PortList::MAX_PORTS
    }
}

fn parse_number(value: &str, token: &str) -> Result<u32, PortError> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PortError::InvalidPortToken(token.to_string()));
    }
    // Saturate absurdly long digit strings; they are dropped as out of range.
    Ok(value.parse().unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(65535).is_some());
        assert_eq!(Port::try_from(0), Err(PortError::OutOfRange(0)));
    }

    #[test]
    fn test_web_preset() {
        let ports = PortList::resolve(Some("web"), None).unwrap();
        assert_eq!(ports.to_u16s(), vec![80, 443, 8080, 8443]);
        assert_eq!(PortList::resolve(Some("web"), None).unwrap(), ports);
    }

    #[test]
    fn test_unknown_preset_defaults_to_common() {
        let common = PortList::from_preset(PortPreset::Common);
        assert_eq!(PortList::resolve(None, None).unwrap(), common);
        assert_eq!(PortList::resolve(Some("bogus"), Some("1-5")).unwrap(), common);
    }

    #[test]
    fn test_extended_alias() {
        let all = PortList::resolve(Some("extended"), None).unwrap();
        assert_eq!(all, PortList::resolve(Some("all"), None).unwrap());
        assert!(all.len() <= PortList::MAX_PORTS);
    }

    #[test]
    fn test_custom_dedup_keeps_first_seen_order() {
        let ports = PortList::resolve(Some("custom"), Some("80,22,80-82")).unwrap();
        assert_eq!(ports.to_u16s(), vec![80, 22, 81, 82]);
    }

    #[test]
    fn test_custom_requires_ports() {
        assert_eq!(
            PortList::resolve(Some("custom"), None),
            Err(PortError::MissingCustomPorts)
        );
        assert_eq!(
            PortList::resolve(Some("custom"), Some("  ")),
            Err(PortError::MissingCustomPorts)
        );
    }

    #[test]
    fn test_custom_invalid_token() {
        assert_eq!(
            PortList::parse_custom("80,http"),
            Err(PortError::InvalidPortToken("http".to_string()))
        );
        assert_eq!(
            PortList::parse_custom("1-2-3"),
            Err(PortError::InvalidPortToken("1-2-3".to_string()))
        );
        assert!(PortList::parse_custom("-5").is_err());
    }

    #[test]
    fn test_custom_drops_out_of_range() {
        let ports = PortList::parse_custom("0,22,70000,65534-65540").unwrap();
        assert_eq!(ports.to_u16s(), vec![22, 65534, 65535]);
        assert_eq!(PortList::parse_custom("0,99999"), Err(PortError::Empty));
    }

    #[test]
    fn test_custom_reversed_range_is_empty() {
        let ports = PortList::parse_custom("90-80, 443,").unwrap();
        assert_eq!(ports.to_u16s(), vec![443]);
    }

    #[test]
    fn test_custom_truncates_to_bound() {
        let ports = PortList::parse_custom("1-65535").unwrap();
        assert_eq!(ports.len(), PortList::MAX_PORTS);
        assert_eq!(ports.as_slice()[99].as_u16(), 100);

        let ports = PortList::parse_custom("5000,1-200").unwrap();
        assert_eq!(ports.len(), PortList::MAX_PORTS);
        assert_eq!(ports.as_slice()[0].as_u16(), 5000);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("WEB".parse::<PortPreset>().unwrap(), PortPreset::Web);
        assert!("nope".parse::<PortPreset>().is_err());
        assert_eq!(PortPreset::All.to_string(), "all");
    }
}
