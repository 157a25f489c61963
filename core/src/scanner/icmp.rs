use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use surge_ping::{Client, Config as PingConfig, PingIdentifier, PingSequence, SurgeError};
use sweepr_common::debug;
use sweepr_common::network::host::ProbeResult;

use super::Prober;

const PAYLOAD: [u8; 56] = [0; 56];

/// Native ICMP echo prober.
///
/// One client (and socket) is shared by every probe; replies are matched back
/// to their pinger by identifier.
pub struct IcmpProber {
    client: Client,
}

impl IcmpProber {
    /// Opens the ICMP socket. Must be called from inside a Tokio runtime.
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::new(&PingConfig::default()).context("opening ICMP socket")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, addr: Ipv4Addr, timeout: Duration) -> ProbeResult {
        let ident = PingIdentifier(rand::random::<u16>());
        let mut pinger = self.client.pinger(IpAddr::V4(addr), ident).await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(0), &PAYLOAD).await {
            Ok((_reply, rtt)) => ProbeResult::alive(addr, rtt),
            Err(SurgeError::Timeout { .. }) => ProbeResult::down(addr),
            Err(e) => {
                debug!("ICMP probe to {addr} failed: {e}");
                ProbeResult::down(addr)
            }
        }
    }
}
