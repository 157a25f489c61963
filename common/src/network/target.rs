//! # Sweep Target Model
//!
//! A sweep can be described either by two explicit bounds or by a single
//! target expression:
//! * A single IPv4 address (`192.168.1.5`).
//! * An IPv4 range (`192.168.1.1-192.168.1.50` or the short `192.168.1.1-50`).
//! * A CIDR block (`192.168.1.0/24`).
//! * The keyword `lan`, the private network of the best local interface.
//!
//! Every form reduces to one [`Ipv4Range`].

use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::SweepError;
use crate::network::interface;
use crate::network::range::{self, Ipv4Range};
use crate::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// The local area network of the best available interface.
    Lan,
    /// A single host.
    Host { target_addr: Ipv4Addr },
    /// A contiguous IPv4 range.
    Range { ipv4_range: Ipv4Range },
}

impl FromStr for Target {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.eq_ignore_ascii_case("lan") {
            return Ok(Target::Lan);
        }

        if let Ok(target_addr) = s.parse::<Ipv4Addr>() {
            return Ok(Target::Host { target_addr });
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_cidr_range(s)? {
            return Ok(target);
        }

        Err(SweepError::InvalidTarget(s.to_string()))
    }
}

impl Target {
    /// Builds a target from two explicit bounds.
    pub fn from_bounds(start: &str, end: &str) -> Result<Self, SweepError> {
        let ipv4_range = Ipv4Range::parse(start, end)?;
        Ok(Target::Range { ipv4_range })
    }

    pub fn into_range(self) -> anyhow::Result<Ipv4Range> {
        match self {
            Target::Lan => {
                let Some(net) = interface::get_lan_network()? else {
                    anyhow::bail!("no private IPv4 network found on any interface");
                };
                let full = range::cidr_range(net.network(), net.prefix())?;
                let usable = range::usable_hosts(full);
                if usable == full {
                    warn!("Network too small to strip broadcast, sweeping full range.");
                }
                info!("Sweeping LAN from {} to {}", usable.start(), usable.end());
                Ok(usable)
            }
            Target::Host { target_addr } => Ok(Ipv4Range::single(target_addr)),
            Target::Range { ipv4_range } => Ok(ipv4_range),
        }
    }
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
fn parse_ip_range(s: &str) -> Result<Option<Target>, SweepError> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let start_addr = start_str
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| SweepError::InvalidAddress(start_str.to_string()))?;

    let end_addr = parse_range_end_addr(end_str.trim(), &start_addr, s)?;

    let ipv4_range = Ipv4Range::new(start_addr, end_addr)?;
    Ok(Some(Target::Range { ipv4_range }))
}

/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(
    end_str: &str,
    start_addr: &Ipv4Addr,
    original_s: &str,
) -> Result<Ipv4Addr, SweepError> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    if end_str.is_empty() {
        return Err(SweepError::InvalidTarget(format!(
            "range end cannot be empty: {original_s}"
        )));
    }

    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| SweepError::InvalidAddress(end_str.to_string()))?;

    if partial_octets.len() > 4 {
        return Err(SweepError::InvalidAddress(end_str.to_string()));
    }

    let mut end_octets = start_addr.octets();
    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr_range(s: &str) -> Result<Option<Target>, SweepError> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let ipv4_addr = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|_| SweepError::InvalidAddress(ip_str.to_string()))?;

    let prefix = prefix_str
        .parse::<u8>()
        .map_err(|_| SweepError::InvalidTarget(format!("invalid prefix in '{s}'")))?;

    let ipv4_range = range::cidr_range(ipv4_addr, prefix)
        .map_err(|e| SweepError::InvalidTarget(e.to_string()))?;

    Ok(Some(Target::Range { ipv4_range }))
}
