use std::time::Duration;

use crate::error::SweepError;

pub const DEFAULT_CONCURRENCY: usize = 100;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1_000);
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_millis(1_500);

#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of echo probes in flight at once.
    pub concurrency: usize,
    /// How long a single probe waits for a reply before the host counts as down.
    pub probe_timeout: Duration,
    /// Pause between two probe dispatches. Zero sends as fast as permits allow.
    pub interval: Duration,
    /// Upper bound for each individual resolution strategy.
    pub resolve_timeout: Duration,
    /// Skips the resolver entirely; every live host is reported unresolved.
    pub no_resolve: bool,
    /// Shell out to the platform `ping` instead of opening ICMP sockets.
    pub system_ping: bool,
    pub quiet: u8,
    /// Disables the keyboard listener used to abort a sweep early.
    pub disable_input: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            interval: Duration::ZERO,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            no_resolve: false,
            system_ping: false,
            quiet: 0,
            disable_input: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.concurrency == 0 {
            return Err(SweepError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.probe_timeout.is_zero() {
            return Err(SweepError::InvalidConfig(
                "probe timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
