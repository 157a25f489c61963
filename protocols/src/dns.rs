use std::net::Ipv4Addr;

use dns_parser::{Builder, QueryClass, QueryType};

/// `1.2.3.4` becomes `4.3.2.1.in-addr.arpa`.
pub fn reverse_ptr_name(addr: Ipv4Addr) -> String {
    let [a, b, c, d] = addr.octets();
    format!("{d}.{c}.{b}.{a}.in-addr.arpa")
}

/// Builds a single-question PTR query for `addr`.
///
/// `prefer_unicast` sets the mDNS "QU" bit, asking responders to reply
/// straight to the querying socket.
pub fn create_ptr_packet(addr: Ipv4Addr, id: u16, prefer_unicast: bool) -> anyhow::Result<Vec<u8>> {
    let qname = reverse_ptr_name(addr);
    let mut builder = Builder::new_query(id, !prefer_unicast);
    builder.add_question(&qname, prefer_unicast, QueryType::PTR, QueryClass::IN);
    builder
        .build()
        .map_err(|_| anyhow::anyhow!("PTR query for {addr} does not fit a single packet"))
}

#[cfg(test)]
const DNS_HDR_LEN: usize = 12;

/// Encodes a dotted name into length-prefixed labels.
#[cfg(test)]
fn encode_dns_name(name: &str) -> Vec<u8> {
    let mut encoded: Vec<u8> = Vec::new();
    for label in name.split('.').filter(|label| !label.is_empty()) {
        encoded.push(label.len() as u8);
        encoded.extend_from_slice(label.as_bytes());
    }
    encoded.push(0);
    encoded
}

/// Hand-assembles a response with one question and one PTR answer pointing
/// back at the question name.
#[cfg(test)]
pub(crate) fn ptr_response(id: u16, qname: &str, target: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&id.to_be_bytes());
    buf.extend_from_slice(&0x8400u16.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());

    buf.extend_from_slice(&encode_dns_name(qname));
    buf.extend_from_slice(&12u16.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());

    let rdata = encode_dns_name(target);
    buf.extend_from_slice(&[0xC0, DNS_HDR_LEN as u8]);
    buf.extend_from_slice(&12u16.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&120u32.to_be_bytes());
    buf.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    buf.extend_from_slice(&rdata);
    buf
}
