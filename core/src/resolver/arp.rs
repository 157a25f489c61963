use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;
use sweepr_common::network::host::Strategy;

use super::ResolveStrategy;
use crate::neighbor::NeighborTable;

/// Last resort: the name the neighbor cache tool printed next to the address.
pub struct ArpStrategy {
    table: Arc<dyn NeighborTable>,
}

impl ArpStrategy {
    pub fn new(table: Arc<dyn NeighborTable>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl ResolveStrategy for ArpStrategy {
    fn kind(&self) -> Strategy {
        Strategy::Arp
    }

    async fn lookup(&self, addr: Ipv4Addr) -> anyhow::Result<Option<String>> {
        let entries = self.table.entries().await?;
        Ok(entries
            .iter()
            .filter(|entry| entry.addr == addr)
            .find_map(|entry| entry.usable_name())
            .map(str::to_string))
    }
}
