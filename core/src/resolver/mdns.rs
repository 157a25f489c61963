use std::net::Ipv4Addr;

use anyhow::Context;
use async_trait::async_trait;
use sweepr_common::debug;
use sweepr_common::network::host::Strategy;
use sweepr_protocols::mdns::{self, MDNS_PORT};
use tokio::net::UdpSocket;

use super::{ResolveStrategy, port_closed};

const MDNS_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// Reverse lookup answered by the host's own multicast DNS responder.
///
/// The query goes to the host over a connected socket and to the mDNS group
/// from a second one, both with the unicast-response bit set. A host that
/// refuses UDP/5353 ends the lookup at once.
#[derive(Debug, Default, Clone, Copy)]
pub struct MdnsStrategy;

#[async_trait]
impl ResolveStrategy for MdnsStrategy {
    fn kind(&self) -> Strategy {
        Strategy::Mdns
    }

    async fn lookup(&self, addr: Ipv4Addr) -> anyhow::Result<Option<String>> {
        let query = mdns::create_reverse_query(addr)?;

        let direct = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .context("binding UDP socket for mDNS")?;
        direct
            .connect((addr, MDNS_PORT))
            .await
            .context("connecting mDNS socket")?;
        direct.send(&query).await.context("sending mDNS query")?;

        let group = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .context("binding UDP socket for mDNS group")?;
        if let Err(e) = group.send_to(&query, (MDNS_GROUP, MDNS_PORT)).await {
            debug!("mDNS group query for {addr} not sent: {e}");
        }

        let mut direct_buf = [0u8; 9000];
        let mut group_buf = [0u8; 9000];
        loop {
            tokio::select! {
                received = direct.recv(&mut direct_buf) => {
                    let len = match received {
                        Ok(len) => len,
                        Err(e) if port_closed(&e) => {
                            debug!("{addr} has no mDNS responder");
                            return Ok(None);
                        }
                        Err(e) => return Err(e).context("receiving mDNS reply"),
                    };
                    // The host itself answered; whatever it said is final.
                    return match mdns::extract_hostname(&direct_buf[..len], addr) {
                        Ok(name) => Ok(name),
                        Err(e) => {
                            debug!("Ignoring mDNS reply from {addr}: {e:#}");
                            Ok(None)
                        }
                    };
                }
                received = group.recv_from(&mut group_buf) => {
                    let (len, from) = received.context("receiving mDNS group reply")?;
                    match mdns::extract_hostname(&group_buf[..len], addr) {
                        Ok(Some(name)) => return Ok(Some(name)),
                        Ok(None) => {}
                        Err(e) => debug!("Ignoring mDNS reply from {from}: {e:#}"),
                    }
                }
            }
        }
    }
}
