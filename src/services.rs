//! Static port → service name lookup.
//!
//! No fingerprinting happens here; a name only says what usually listens on
//! a port.

use std::collections::HashMap;
use std::sync::LazyLock;

const WELL_KNOWN: &[(u16, &str)] = &[
    (7, "echo"),
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (53, "dns"),
    (80, "http"),
    (88, "kerberos"),
    (110, "pop3"),
    (111, "rpcbind"),
    (119, "nntp"),
    (135, "msrpc"),
    (139, "netbios-ssn"),
    (143, "imap"),
    (179, "bgp"),
    (389, "ldap"),
    (443, "https"),
    (445, "microsoft-ds"),
    (465, "smtps"),
    (514, "syslog"),
    (515, "printer"),
    (548, "afp"),
    (554, "rtsp"),
    (587, "submission"),
    (631, "ipp"),
    (636, "ldaps"),
    (873, "rsync"),
    (993, "imaps"),
    (995, "pop3s"),
    (1433, "mssql"),
    (1521, "oracle"),
    (1723, "pptp"),
    (1883, "mqtt"),
    (2049, "nfs"),
    (2375, "docker"),
    (3000, "grafana"),
    (3128, "squid"),
    (3306, "mysql"),
    (3389, "rdp"),
    (5000, "upnp"),
    (5060, "sip"),
    (5432, "postgresql"),
    (5672, "amqp"),
    (5900, "vnc"),
    (5984, "couchdb"),
    (6379, "redis"),
    (6443, "kubernetes-api"),
    (8000, "http-alt"),
    (8008, "http-alt"),
    (8080, "http-proxy"),
    (8081, "http-alt"),
    (8443, "https-alt"),
    (8888, "http-alt"),
    (9042, "cassandra"),
    (9090, "prometheus"),
    (9100, "jetdirect"),
    (9200, "elasticsearch"),
    (10000, "webmin"),
    (11211, "memcached"),
    (27017, "mongodb"),
];

static PORT_SERVICES: LazyLock<HashMap<u16, &'static str>> =
    LazyLock::new(|| WELL_KNOWN.iter().copied().collect());

/// Look up the probable service name for a given port.
pub fn service_name(port: u16) -> Option<&'static str> {
    PORT_SERVICES.get(&port).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_ports() {
        assert_eq!(service_name(22), Some("ssh"));
        assert_eq!(service_name(80), Some("http"));
        assert_eq!(service_name(443), Some("https"));
        assert_eq!(service_name(5432), Some("postgresql"));
    }

    #[test]
    fn test_unknown_port() {
        assert_eq!(service_name(12345), None);
    }

    #[test]
    fn test_table_has_no_duplicates() {
        assert_eq!(PORT_SERVICES.len(), WELL_KNOWN.len());
    }
}
