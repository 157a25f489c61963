use std::net::Ipv4Addr;

use anyhow::Context;
use async_trait::async_trait;
use sweepr_common::debug;
use sweepr_common::network::host::Strategy;
use sweepr_protocols::netbios::{self, NETBIOS_NS_PORT};
use tokio::net::UdpSocket;

use super::{ResolveStrategy, port_closed};

/// Asks the host's NetBIOS name service for its name table.
///
/// The socket is connected, so a host without the service refuses the
/// request at once instead of running out the resolver's deadline.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetBiosStrategy;

#[async_trait]
impl ResolveStrategy for NetBiosStrategy {
    fn kind(&self) -> Strategy {
        Strategy::NetBios
    }

    async fn lookup(&self, addr: Ipv4Addr) -> anyhow::Result<Option<String>> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .context("binding UDP socket for NetBIOS")?;
        socket
            .connect((addr, NETBIOS_NS_PORT))
            .await
            .context("connecting NetBIOS socket")?;
        let id: u16 = rand::random();
        socket
            .send(&netbios::create_node_status_request(id))
            .await
            .context("sending NetBIOS node status request")?;

        let mut buf = [0u8; 1500];
        loop {
            let len = match socket.recv(&mut buf).await {
                Ok(len) => len,
                Err(e) if port_closed(&e) => {
                    debug!("{addr} has no NetBIOS name service");
                    return Ok(None);
                }
                Err(e) => return Err(e).context("receiving NetBIOS reply"),
            };
            match netbios::parse_node_status(&buf[..len], id) {
                Ok(names) => return Ok(netbios::workstation_name(&names)),
                Err(e) => debug!("Ignoring NetBIOS reply from {addr}: {e}"),
            }
        }
    }
}
