use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sweepr_common::network::host::{ProbeResult, Strategy};
use sweepr_core::neighbor::{NeighborEntry, NeighborState, NeighborTable};
use sweepr_core::resolver::ResolveStrategy;
use sweepr_core::scanner::Prober;

/// Answers for a fixed set of addresses and counts what it was asked.
pub struct ScriptedProber {
    up: HashSet<Ipv4Addr>,
    delay: Duration,
    calls: AtomicUsize,
    outstanding: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedProber {
    pub fn new(up: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        Self::with_delay(up, Duration::from_millis(1))
    }

    pub fn with_delay(up: impl IntoIterator<Item = Ipv4Addr>, delay: Duration) -> Self {
        Self {
            up: up.into_iter().collect(),
            delay,
            calls: AtomicUsize::new(0),
            outstanding: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of probes observed running at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, addr: Ipv4Addr, _timeout: Duration) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.outstanding.fetch_sub(1, Ordering::SeqCst);

        if self.up.contains(&addr) {
            ProbeResult::alive(addr, self.delay)
        } else {
            ProbeResult::down(addr)
        }
    }
}

/// A strategy that knows a fixed address book and records every lookup.
pub struct AddressBook {
    kind: Strategy,
    names: HashMap<Ipv4Addr, String>,
    asked: Journal,
}

/// Addresses a strategy was consulted for, shared with the test body.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Ipv4Addr>>>);

impl Journal {
    fn push(&self, addr: Ipv4Addr) {
        if let Ok(mut asked) = self.0.lock() {
            asked.push(addr);
        }
    }

    pub fn entries(&self) -> Vec<Ipv4Addr> {
        match self.0.lock() {
            Ok(asked) => asked.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AddressBook {
    pub fn new(kind: Strategy, names: &[(Ipv4Addr, &str)]) -> Self {
        Self {
            kind,
            names: names
                .iter()
                .map(|(addr, name)| (*addr, name.to_string()))
                .collect(),
            asked: Journal::default(),
        }
    }

    pub fn empty(kind: Strategy) -> Self {
        Self::new(kind, &[])
    }

    pub fn journal(&self) -> Journal {
        self.asked.clone()
    }
}

#[async_trait]
impl ResolveStrategy for AddressBook {
    fn kind(&self) -> Strategy {
        self.kind
    }

    async fn lookup(&self, addr: Ipv4Addr) -> anyhow::Result<Option<String>> {
        self.asked.push(addr);
        Ok(self.names.get(&addr).cloned())
    }
}

/// A strategy whose underlying tool is missing.
pub struct Unavailable(pub Strategy);

#[async_trait]
impl ResolveStrategy for Unavailable {
    fn kind(&self) -> Strategy {
        self.0
    }

    async fn lookup(&self, _addr: Ipv4Addr) -> anyhow::Result<Option<String>> {
        anyhow::bail!("{} is not available on this host", self.0)
    }
}

/// A neighbor cache with fixed contents.
#[derive(Default)]
pub struct StaticNeighbors(pub Vec<NeighborEntry>);

impl StaticNeighbors {
    pub fn named(entries: &[(Ipv4Addr, &str)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(addr, name)| NeighborEntry {
                    addr: *addr,
                    name: Some(name.to_string()),
                    mac: None,
                    state: NeighborState::Reachable,
                })
                .collect(),
        )
    }
}

#[async_trait]
impl NeighborTable for StaticNeighbors {
    async fn entries(&self) -> anyhow::Result<Vec<NeighborEntry>> {
        Ok(self.0.clone())
    }
}
