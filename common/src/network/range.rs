use std::net::Ipv4Addr;

use crate::error::SweepError;

/// Inclusive range of IPv4 addresses, walked as unsigned 32-bit integers.
///
/// A constructed range always satisfies `start_addr <= end_addr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    start_addr: Ipv4Addr,
    end_addr: Ipv4Addr,
}

#[allow(clippy::len_without_is_empty)]
impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Result<Self, SweepError> {
        if u32::from(end_addr) < u32::from(start_addr) {
            return Err(SweepError::InvalidRange {
                start: start_addr,
                end: end_addr,
            });
        }
        Ok(Self {
            start_addr,
            end_addr,
        })
    }

    /// Parses both bounds and builds the range.
    pub fn parse(start: &str, end: &str) -> Result<Self, SweepError> {
        let start_addr = parse_bound(start)?;
        let end_addr = parse_bound(end)?;
        Self::new(start_addr, end_addr)
    }

    pub fn single(addr: Ipv4Addr) -> Self {
        Self {
            start_addr: addr,
            end_addr: addr,
        }
    }

    pub fn start(&self) -> Ipv4Addr {
        self.start_addr
    }

    pub fn end(&self) -> Ipv4Addr {
        self.end_addr
    }

    /// Number of addresses in the range. A full `0.0.0.0/0` holds 2^32 of them.
    pub fn len(&self) -> u64 {
        u64::from(u32::from(self.end_addr)) - u64::from(u32::from(self.start_addr)) + 1
    }

    pub fn to_iter(&self) -> impl Iterator<Item = Ipv4Addr> + Send + 'static {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }
}

fn parse_bound(s: &str) -> Result<Ipv4Addr, SweepError> {
    s.trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| SweepError::InvalidAddress(s.to_string()))
}

pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = pnet::ipnetwork::Ipv4Network::new(ip, prefix)?;
    let range = Ipv4Range::new(network.network(), network.broadcast())?;
    Ok(range)
}

/// Strips the network and broadcast addresses when the block is large enough
/// to have usable hosts in between.
pub fn usable_hosts(range: Ipv4Range) -> Ipv4Range {
    let start: u32 = range.start_addr.into();
    let end: u32 = range.end_addr.into();
    if end.saturating_sub(start) < 2 {
        return range;
    }
    Ipv4Range {
        start_addr: Ipv4Addr::from(start + 1),
        end_addr: Ipv4Addr::from(end - 1),
    }
}
