use std::net::{IpAddr, Ipv4Addr};

use anyhow::Context;
use async_trait::async_trait;
use sweepr_common::debug;
use sweepr_common::network::host::Strategy;

use super::ResolveStrategy;

/// PTR lookup through the system resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReverseDnsStrategy;

#[async_trait]
impl ResolveStrategy for ReverseDnsStrategy {
    fn kind(&self) -> Strategy {
        Strategy::ReverseDns
    }

    async fn lookup(&self, addr: Ipv4Addr) -> anyhow::Result<Option<String>> {
        let answer = tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&IpAddr::V4(addr)))
            .await
            .context("reverse lookup task panicked")?;

        match answer {
            Ok(name) => Ok(accept_answer(addr, &name)),
            Err(e) => {
                debug!("No PTR record for {addr}: {e}");
                Ok(None)
            }
        }
    }
}

/// Some resolvers echo the queried address back instead of failing.
fn accept_answer(addr: Ipv4Addr, name: &str) -> Option<String> {
    let name = name.trim().trim_end_matches('.');
    if name.is_empty() || name == addr.to_string() {
        return None;
    }
    Some(name.to_string())
}
