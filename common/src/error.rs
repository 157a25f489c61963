use std::net::Ipv4Addr;

use thiserror::Error;

/// Errors that stop a sweep before any probe is sent.
///
/// Everything that can go wrong *during* a sweep (timeouts, missing lookup
/// utilities, malformed replies) is recovered locally and never surfaces here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    #[error("invalid range: end address {end} precedes start address {start}")]
    InvalidRange { start: Ipv4Addr, end: Ipv4Addr },

    #[error("invalid range: '{0}' is not an IPv4 address")]
    InvalidAddress(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SweepError {
    /// Both malformed bounds and reversed bounds count as an invalid range.
    pub fn is_invalid_range(&self) -> bool {
        matches!(self, Self::InvalidRange { .. } | Self::InvalidAddress(_))
    }
}
