//! # Sweep Service
//!
//! Runs the full use case: find the live hosts of a range, then name each of
//! them, and hand back one record per live host in ascending address order.

use std::net::Ipv4Addr;

use sweepr_common::error::SweepError;
use sweepr_common::network::host::{HostName, ProbeResult, ResolutionRecord};
use sweepr_common::network::range::Ipv4Range;
use sweepr_common::success;
use tokio_util::sync::CancellationToken;

use crate::resolver::HostnameResolver;
use crate::scanner::AddressRangeScanner;

/// Orchestrates a sweep by:
/// 1. delegating liveness to the [`AddressRangeScanner`],
/// 2. ordering the live set numerically,
/// 3. naming each host with the [`HostnameResolver`], unless resolution is off.
pub struct SweepService {
    scanner: AddressRangeScanner,
    resolver: Option<HostnameResolver>,
}

impl SweepService {
    pub fn new(scanner: AddressRangeScanner, resolver: HostnameResolver) -> Self {
        Self {
            scanner,
            resolver: Some(resolver),
        }
    }

    /// Every live host is reported unresolved.
    pub fn without_resolver(scanner: AddressRangeScanner) -> Self {
        Self {
            scanner,
            resolver: None,
        }
    }

    pub async fn run_bounds(
        &self,
        start: &str,
        end: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResolutionRecord>, SweepError> {
        let range = Ipv4Range::parse(start, end)?;
        Ok(self.run(range, cancel).await)
    }

    pub async fn run(&self, range: Ipv4Range, cancel: &CancellationToken) -> Vec<ResolutionRecord> {
        let mut live: Vec<ProbeResult> = self.scanner.scan(range, cancel).await;
        order_live_set(&mut live);

        let unit = if live.len() == 1 { "host" } else { "hosts" };
        success!("{} {unit} responded", live.len());

        match &self.resolver {
            Some(resolver) => resolver.resolve_all(&live, cancel).await,
            None => live
                .iter()
                .map(|p| ResolutionRecord::new(p.addr, HostName::Unresolved).with_latency(p.latency))
                .collect(),
        }
    }
}

fn order_live_set(live: &mut Vec<ProbeResult>) {
    live.sort_by_key(|probe| u32::from(probe.addr));
    live.dedup_by_key(|probe| probe.addr);
}

/// Ascending numeric order, the order every record list is reported in.
pub fn sort_records(records: &mut [ResolutionRecord]) {
    records.sort_by_key(|record| u32::from(record.addr));
}

pub fn addresses(records: &[ResolutionRecord]) -> Vec<Ipv4Addr> {
    records.iter().map(|r| r.addr).collect()
}
