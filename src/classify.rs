//! Private/reserved IPv4 address classification.

/// Outcome of classifying an IPv4 literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpClass {
    /// Publicly routable, safe to look up.
    Public,
    /// Private or reserved, with a human-readable reason.
    Private { reason: &'static str },
}

impl IpClass {
    /// Returns true for private/reserved addresses.
    pub fn is_private(&self) -> bool {
        matches!(self, IpClass::Private { .. })
    }
}

/// Classify a dotted-quad IPv4 literal as public or private/reserved.
///
/// Checks the private ranges (10/8, 172.16/12, 192.168/16), loopback (127/8)
/// and link-local (169.254/16). Anything that does not parse as four octets
/// classifies as public: format validation is the caller's concern, this
/// function only answers "is it routable".
pub fn classify(address: &str) -> IpClass {
    let mut octets = [0u8; 4];
    let mut parts = address.split('.');

    for octet in &mut octets {
        match parts.next().and_then(|p| p.parse::<u8>().ok()) {
            Some(value) => *octet = value,
            None => return IpClass::Public,
        }
    }

    if parts.next().is_some() {
        return IpClass::Public;
    }

    let reason = match (octets[0], octets[1]) {
        (10, _) => "Private network address (10.x.x.x) cannot be checked",
        (172, 16..=31) => "Private network address (172.16-31.x.x) cannot be checked",
        (192, 168) => "Private network address (192.168.x.x) cannot be checked",
        (127, _) => "Loopback address (127.x.x.x) cannot be checked",
        (169, 254) => "Link-local address (169.254.x.x) cannot be checked",
        _ => return IpClass::Public,
    };

    IpClass::Private { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_addresses() {
        for ip in ["8.8.8.8", "1.1.1.1", "203.0.113.7", "172.15.0.1", "172.32.0.1", "169.253.1.1", "192.167.1.1", "11.0.0.1"] {
            assert_eq!(classify(ip), IpClass::Public, "{ip} should be public");
        }
    }

    #[test]
    fn test_private_10_range() {
        for ip in ["10.0.0.0", "10.1.2.3", "10.255.255.255"] {
            assert!(classify(ip).is_private(), "{ip} should be private");
        }
    }

    #[test]
    fn test_private_172_range() {
        assert!(classify("172.16.0.1").is_private());
        assert!(classify("172.31.255.255").is_private());
        assert_eq!(classify("172.15.255.255"), IpClass::Public);
        assert_eq!(classify("172.32.0.0"), IpClass::Public);
    }

    #[test]
    fn test_private_192_168_range() {
        assert!(classify("192.168.0.1").is_private());
        assert!(classify("192.168.255.255").is_private());
        assert_eq!(classify("192.169.0.1"), IpClass::Public);
    }

    #[test]
    fn test_loopback() {
        assert!(classify("127.0.0.1").is_private());
        assert!(classify("127.255.0.1").is_private());
    }

    #[test]
    fn test_link_local() {
        assert!(classify("169.254.0.1").is_private());
        assert_eq!(classify("169.255.0.1"), IpClass::Public);
    }

    #[test]
    fn test_distinct_reasons() {
        let reasons: Vec<&str> = ["10.0.0.1", "172.16.0.1", "192.168.1.1", "127.0.0.1", "169.254.1.1"]
            .iter()
            .map(|ip| match classify(ip) {
                IpClass::Private { reason } => reason,
                IpClass::Public => panic!("{ip} should be private"),
            })
            .collect();

        for (i, a) in reasons.iter().enumerate() {
            for b in &reasons[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_malformed_input_is_public() {
        for input in ["", "not-an-ip", "10.0.0", "10.0.0.0.0", "10.0.0.256", "10.0.0.-1", "10.x.0.1", "::1", "10.0.0.1 "] {
            assert_eq!(classify(input), IpClass::Public, "{input:?} should fail open");
        }
    }

    #[test]
    fn test_reason_mentions_range() {
        match classify("10.1.1.1") {
            IpClass::Private { reason } => assert!(reason.contains("10.x.x.x")),
            IpClass::Public => panic!("expected private"),
        }
        match classify("169.254.9.9") {
            IpClass::Private { reason } => assert!(reason.contains("Link-local")),
            IpClass::Public => panic!("expected private"),
        }
    }
}
