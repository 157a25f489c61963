//! Best-effort naming of live hosts.
//!
//! A [`HostnameResolver`] owns an ordered chain of [`ResolveStrategy`]
//! implementations and walks it for every address, stopping at the first one
//! that produces a name. A strategy that errors or times out is treated exactly
//! like one that found nothing: the walk moves on. Only a fully exhausted
//! chain is visible to the caller, as [`HostName::Unresolved`].

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sweepr_common::debug;
use sweepr_common::network::host::{
    HostName, LocalIdentity, ProbeResult, ResolutionRecord, Strategy,
};
use tokio_util::sync::CancellationToken;

use crate::neighbor::{ArpCommand, NeighborTable};

mod arp;
mod mdns;
mod netbios;
mod reverse_dns;
mod self_check;

pub use arp::ArpStrategy;
pub use mdns::MdnsStrategy;
pub use netbios::NetBiosStrategy;
pub use reverse_dns::ReverseDnsStrategy;
pub use self_check::SelfCheckStrategy;

/// One way of turning an address into a name.
///
/// `Ok(None)` means "no answer"; `Err` means the method itself was unusable
/// (missing tool, malformed reply). The resolver treats both the same.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    fn kind(&self) -> Strategy;

    async fn lookup(&self, addr: Ipv4Addr) -> anyhow::Result<Option<String>>;
}

pub struct HostnameResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
    timeout: Duration,
}

impl HostnameResolver {
    /// Builds a resolver over `strategies`. They are kept in canonical order
    /// (self-check, NetBIOS, reverse DNS, mDNS, ARP) whatever order they were
    /// passed in.
    pub fn new(mut strategies: Vec<Box<dyn ResolveStrategy>>, timeout: Duration) -> Self {
        strategies.sort_by_key(|strategy| strategy.kind());
        Self {
            strategies,
            timeout,
        }
    }

    /// The full chain backed by the real network and the `arp` tool.
    pub fn system(identity: LocalIdentity, timeout: Duration) -> Self {
        Self::with_neighbors(identity, Arc::new(ArpCommand), timeout)
    }

    pub fn with_neighbors(
        identity: LocalIdentity,
        neighbors: Arc<dyn NeighborTable>,
        timeout: Duration,
    ) -> Self {
        Self::new(
            vec![
                Box::new(SelfCheckStrategy::new(identity)),
                Box::new(NetBiosStrategy),
                Box::new(ReverseDnsStrategy),
                Box::new(MdnsStrategy),
                Box::new(ArpStrategy::new(neighbors)),
            ],
            timeout,
        )
    }

    pub fn strategies(&self) -> impl Iterator<Item = Strategy> + '_ {
        self.strategies.iter().map(|s| s.kind())
    }

    pub async fn resolve(&self, addr: Ipv4Addr) -> HostName {
        for strategy in &self.strategies {
            let kind = strategy.kind();
            match tokio::time::timeout(self.timeout, strategy.lookup(addr)).await {
                Ok(Ok(Some(name))) => match printable(&name) {
                    Some(name) => {
                        debug!("{addr} resolved by {kind}: {name}");
                        return HostName::resolved(name, kind);
                    }
                    None => debug!("{kind} answer for {addr} rejected: {name:?}"),
                },
                Ok(Ok(None)) => {}
                Ok(Err(e)) => debug!("{kind} lookup for {addr} unavailable: {e:#}"),
                Err(_) => debug!("{kind} lookup for {addr} timed out"),
            }
        }
        HostName::Unresolved
    }

    /// Resolves live hosts one after another, keeping their order.
    ///
    /// Once `cancel` fires, the remaining hosts are reported unresolved
    /// without running any strategy.
    pub async fn resolve_all(
        &self,
        live: &[ProbeResult],
        cancel: &CancellationToken,
    ) -> Vec<ResolutionRecord> {
        let mut records = Vec::with_capacity(live.len());
        for probe in live {
            let name = if cancel.is_cancelled() {
                HostName::Unresolved
            } else {
                tokio::select! {
                    name = self.resolve(probe.addr) => name,
                    _ = cancel.cancelled() => HostName::Unresolved,
                }
            };
            records.push(ResolutionRecord::new(probe.addr, name).with_latency(probe.latency));
        }
        records
    }
}

/// Names come from other hosts on the segment and end up on the operator's
/// terminal. Anything carrying control characters (escape sequences, line
/// breaks) is refused.
fn printable(name: &str) -> Option<&str> {
    let name = name.trim();
    if name.is_empty() || name.chars().any(char::is_control) {
        return None;
    }
    Some(name)
}

/// ICMP port unreachable, as surfaced on a connected UDP socket.
fn port_closed(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::ConnectionReset
    )
}
