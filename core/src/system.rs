//! What the sweep needs to know about the machine it runs on.

use std::sync::Arc;

use sweepr_common::config::Config;
use sweepr_common::network::host::LocalIdentity;
use sweepr_common::network::interface;
use sweepr_common::{debug, warn};

use crate::scanner::{IcmpProber, Prober, SystemPingProber};

const FALLBACK_HOSTNAME: &str = "localhost";

/// Reads the configured hostname and every local IPv4 address.
pub fn detect_local_identity() -> LocalIdentity {
    let hostname = match sys_info::hostname() {
        Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
        Ok(_) => FALLBACK_HOSTNAME.to_string(),
        Err(e) => {
            warn!("Could not read hostname: {e}");
            FALLBACK_HOSTNAME.to_string()
        }
    };
    LocalIdentity::new(hostname, interface::local_ipv4_addrs())
}

pub fn is_privileged() -> bool {
    is_root::is_root()
}

/// Native ICMP when possible, the system `ping` otherwise.
///
/// Must be called from inside a Tokio runtime.
pub fn default_prober(cfg: &Config) -> Arc<dyn Prober> {
    if cfg.system_ping {
        debug!("Using system ping as requested");
        return Arc::new(SystemPingProber);
    }

    match IcmpProber::new() {
        Ok(prober) => Arc::new(prober),
        Err(e) => {
            if !is_privileged() {
                warn!("ICMP sockets need elevated privileges, falling back to system ping");
            }
            debug!("ICMP prober unavailable: {e:#}");
            Arc::new(SystemPingProber)
        }
    }
}
