use std::net::Ipv4Addr;

use anyhow::{Context, Result};
use dns_parser::{Packet, RData};

use crate::dns;

pub const MDNS_PORT: u16 = 5353;

/// Reverse query asking the host itself which `.local` name it answers to.
///
/// mDNS queries carry transaction id zero.
pub fn create_reverse_query(addr: Ipv4Addr) -> Result<Vec<u8>> {
    dns::create_ptr_packet(addr, 0, true)
}

/// Picks the PTR answer for `addr` out of an mDNS reply, without the
/// `.local` suffix.
pub fn extract_hostname(data: &[u8], addr: Ipv4Addr) -> Result<Option<String>> {
    let packet = Packet::parse(data).context("failed to parse mDNS packet")?;
    let wanted = dns::reverse_ptr_name(addr);

    let hostname = packet
        .answers
        .iter()
        .chain(packet.additional.iter())
        .filter(|record| record.name.to_string().eq_ignore_ascii_case(&wanted))
        .find_map(|record| match &record.data {
            RData::PTR(ptr) => Some(strip_local(&ptr.0.to_string())),
            _ => None,
        })
        .filter(|name| !name.is_empty());

    Ok(hostname)
}

fn strip_local(name: &str) -> String {
    let name = name.trim_end_matches('.');
    name.strip_suffix(".local").unwrap_or(name).to_string()
}
