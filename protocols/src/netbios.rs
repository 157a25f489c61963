//! NetBIOS name service node status (NBSTAT) request and response handling.
//!
//! A node status request sent to UDP/137 of a Windows or Samba host is
//! answered with the table of names registered by that host.

use thiserror::Error;

pub const NETBIOS_NS_PORT: u16 = 137;

const NBSTAT_TYPE: u16 = 0x0021;
const IN_CLASS: u16 = 0x0001;
const HEADER_LEN: usize = 12;
const NAME_ENTRY_LEN: usize = 18;
const GROUP_FLAG: u16 = 0x8000;
/// Suffix byte of the workstation service name.
const WORKSTATION_SUFFIX: u8 = 0x00;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NetbiosError {
    #[error("packet truncated at offset {0}")]
    Truncated(usize),
    #[error("transaction id mismatch: expected {expected:#06x}, got {got:#06x}")]
    IdMismatch { expected: u16, got: u16 },
    #[error("response carries no node status answer")]
    NoStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetbiosName {
    pub name: String,
    pub suffix: u8,
    pub group: bool,
}

/// Half-ASCII ("first level") encoding of a 16 byte NetBIOS name.
fn encode_name(raw: &[u8; 16]) -> [u8; 32] {
    let mut encoded = [0u8; 32];
    for (i, b) in raw.iter().enumerate() {
        encoded[i * 2] = (b >> 4) + b'A';
        encoded[i * 2 + 1] = (b & 0x0F) + b'A';
    }
    encoded
}

/// Builds a unicast node status request for the wildcard name `*`.
pub fn create_node_status_request(id: u16) -> Vec<u8> {
    let mut wildcard = [0u8; 16];
    wildcard[0] = b'*';

    let mut packet = Vec::with_capacity(HEADER_LEN + 34 + 4);
    packet.extend_from_slice(&id.to_be_bytes());
    packet.extend_from_slice(&0x0000u16.to_be_bytes());
    packet.extend_from_slice(&1u16.to_be_bytes());
    packet.extend_from_slice(&[0u8; 6]);

    packet.push(32);
    packet.extend_from_slice(&encode_name(&wildcard));
    packet.push(0);
    packet.extend_from_slice(&NBSTAT_TYPE.to_be_bytes());
    packet.extend_from_slice(&IN_CLASS.to_be_bytes());
    packet
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16, NetbiosError> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or(NetbiosError::Truncated(offset))
}

/// Returns the offset right after an encoded name, following no pointers.
fn skip_name(data: &[u8], mut offset: usize) -> Result<usize, NetbiosError> {
    loop {
        let len = *data.get(offset).ok_or(NetbiosError::Truncated(offset))?;
        if len & 0xC0 == 0xC0 {
            return Ok(offset + 2);
        }
        offset += 1;
        if len == 0 {
            return Ok(offset);
        }
        offset += len as usize;
    }
}

/// Parses a node status response and returns its name table.
pub fn parse_node_status(data: &[u8], expected_id: u16) -> Result<Vec<NetbiosName>, NetbiosError> {
    let id = read_u16(data, 0)?;
    if id != expected_id {
        return Err(NetbiosError::IdMismatch {
            expected: expected_id,
            got: id,
        });
    }
    let qdcount = read_u16(data, 4)?;
    let ancount = read_u16(data, 6)?;

    let mut offset = HEADER_LEN;
    for _ in 0..qdcount {
        offset = skip_name(data, offset)? + 4;
    }

    for _ in 0..ancount {
        offset = skip_name(data, offset)?;
        let rtype = read_u16(data, offset)?;
        let rdlen = read_u16(data, offset + 8)? as usize;
        offset += 10;
        let rdata = data
            .get(offset..offset + rdlen)
            .ok_or(NetbiosError::Truncated(offset))?;

        if rtype == NBSTAT_TYPE {
            return parse_name_table(rdata, offset);
        }
        offset += rdlen;
    }

    Err(NetbiosError::NoStatus)
}

fn parse_name_table(rdata: &[u8], base: usize) -> Result<Vec<NetbiosName>, NetbiosError> {
    let count = *rdata.first().ok_or(NetbiosError::Truncated(base))? as usize;
    let mut names = Vec::with_capacity(count);

    for idx in 0..count {
        let start = 1 + idx * NAME_ENTRY_LEN;
        let entry = rdata
            .get(start..start + NAME_ENTRY_LEN)
            .ok_or(NetbiosError::Truncated(base + start))?;
        let flags = u16::from_be_bytes([entry[16], entry[17]]);
        names.push(NetbiosName {
            name: String::from_utf8_lossy(&entry[..15]).trim_end().to_string(),
            suffix: entry[15],
            group: flags & GROUP_FLAG != 0,
        });
    }

    Ok(names)
}

/// The machine name is the unique (non-group) name registered with the
/// workstation suffix.
pub fn workstation_name(names: &[NetbiosName]) -> Option<String> {
    names
        .iter()
        .find(|n| !n.group && n.suffix == WORKSTATION_SUFFIX && !n.name.is_empty())
        .map(|n| n.name.clone())
}
