use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

pub const UNRESOLVED: &str = "unresolved";

/// Outcome of a single liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub addr: Ipv4Addr,
    pub alive: bool,
    pub latency: Option<Duration>,
}

impl ProbeResult {
    pub fn alive(addr: Ipv4Addr, latency: Duration) -> Self {
        Self {
            addr,
            alive: true,
            latency: Some(latency),
        }
    }

    pub fn down(addr: Ipv4Addr) -> Self {
        Self {
            addr,
            alive: false,
            latency: None,
        }
    }
}

/// The resolution methods, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    SelfCheck,
    NetBios,
    ReverseDns,
    Mdns,
    Arp,
}

impl Strategy {
    pub const ORDER: [Strategy; 5] = [
        Strategy::SelfCheck,
        Strategy::NetBios,
        Strategy::ReverseDns,
        Strategy::Mdns,
        Strategy::Arp,
    ];

    /// Suffix appended to names produced by this strategy, if any.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Strategy::SelfCheck => Some("this machine"),
            Strategy::Arp => Some("arp"),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::SelfCheck => "self",
            Strategy::NetBios => "netbios",
            Strategy::ReverseDns => "dns",
            Strategy::Mdns => "mdns",
            Strategy::Arp => "arp",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display name for a live host. There is no empty variant: a host nobody
/// could name is `Unresolved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostName {
    Resolved { name: String, source: Strategy },
    Unresolved,
}

impl HostName {
    pub fn resolved(name: impl Into<String>, source: Strategy) -> Self {
        HostName::Resolved {
            name: name.into(),
            source,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, HostName::Resolved { .. })
    }
}

impl fmt::Display for HostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostName::Resolved { name, source } => match source.tag() {
                Some(tag) => write!(f, "{name} ({tag})"),
                None => f.write_str(name),
            },
            HostName::Unresolved => f.write_str(UNRESOLVED),
        }
    }
}

/// One row of the final table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRecord {
    pub addr: Ipv4Addr,
    pub name: HostName,
    pub latency: Option<Duration>,
}

impl ResolutionRecord {
    pub fn new(addr: Ipv4Addr, name: HostName) -> Self {
        Self {
            addr,
            name,
            latency: None,
        }
    }

    pub fn with_latency(mut self, latency: Option<Duration>) -> Self {
        self.latency = latency;
        self
    }
}

/// Who "this machine" is: its configured hostname and every address bound to
/// one of its interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    pub hostname: String,
    pub addrs: BTreeSet<Ipv4Addr>,
}

impl LocalIdentity {
    pub fn new(hostname: impl Into<String>, addrs: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        Self {
            hostname: hostname.into(),
            addrs: addrs.into_iter().collect(),
        }
    }

    pub fn owns(&self, addr: Ipv4Addr) -> bool {
        self.addrs.contains(&addr)
    }
}
