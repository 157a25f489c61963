use std::net::Ipv4Addr;

use async_trait::async_trait;
use sweepr_common::network::host::{LocalIdentity, Strategy};

use super::ResolveStrategy;

/// Recognises addresses bound to this machine and answers with its own
/// hostname.
pub struct SelfCheckStrategy {
    identity: LocalIdentity,
}

impl SelfCheckStrategy {
    pub fn new(identity: LocalIdentity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl ResolveStrategy for SelfCheckStrategy {
    fn kind(&self) -> Strategy {
        Strategy::SelfCheck
    }

    async fn lookup(&self, addr: Ipv4Addr) -> anyhow::Result<Option<String>> {
        Ok(self
            .identity
            .owns(addr)
            .then(|| self.identity.hostname.clone()))
    }
}
