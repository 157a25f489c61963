use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use sweepr_common::error::SweepError;
use sweepr_common::network::host::{HostName, LocalIdentity, ResolutionRecord, Strategy};
use sweepr_common::network::range::Ipv4Range;
use sweepr_core::CancellationToken;
use sweepr_core::discovery::{self, SweepService};
use sweepr_core::resolver::{ArpStrategy, HostnameResolver, ResolveStrategy, SelfCheckStrategy};
use sweepr_core::scanner::{AddressRangeScanner, ScanSettings};

use crate::fakes::{AddressBook, ScriptedProber, StaticNeighbors, Unavailable};

fn addr(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 1, last)
}

fn settings(concurrency: usize) -> ScanSettings {
    ScanSettings {
        concurrency,
        timeout: Duration::from_millis(50),
        interval: Duration::ZERO,
    }
}

/// The real self-check and ARP strategies over a fixed neighbor cache; the
/// network-facing ones never answer.
fn offline_resolver(neighbors: StaticNeighbors) -> HostnameResolver {
    let identity = LocalIdentity::new("desk", [addr(20)]);
    let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
        Box::new(SelfCheckStrategy::new(identity)),
        Box::new(Unavailable(Strategy::NetBios)),
        Box::new(AddressBook::empty(Strategy::ReverseDns)),
        Box::new(AddressBook::empty(Strategy::Mdns)),
        Box::new(ArpStrategy::new(Arc::new(neighbors))),
    ];
    HostnameResolver::new(strategies, Duration::from_millis(100))
}

#[tokio::test]
async fn small_lan_sweep() {
    let prober = Arc::new(ScriptedProber::new([addr(1), addr(3)]));
    let scanner = AddressRangeScanner::new(prober.clone(), settings(4));
    let service = SweepService::new(
        scanner,
        offline_resolver(StaticNeighbors::named(&[(addr(1), "router")])),
    );

    let records = service
        .run_bounds("192.168.1.1", "192.168.1.5", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        records,
        vec![
            ResolutionRecord::new(addr(1), HostName::resolved("router", Strategy::Arp))
                .with_latency(Some(Duration::from_millis(1))),
            ResolutionRecord::new(addr(3), HostName::Unresolved)
                .with_latency(Some(Duration::from_millis(1))),
        ]
    );
    assert_eq!(records[0].name.to_string(), "router (arp)");
    assert_eq!(records[1].name.to_string(), "unresolved");
    assert_eq!(prober.calls(), 5);
}

#[tokio::test]
async fn reversed_range_is_rejected_before_probing() {
    let prober = Arc::new(ScriptedProber::new([addr(1)]));
    let service = SweepService::without_resolver(AddressRangeScanner::new(
        prober.clone(),
        settings(4),
    ));

    let err = service
        .run_bounds("192.168.1.10", "192.168.1.1", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_invalid_range());
    assert!(matches!(
        err,
        SweepError::InvalidRange { start, end } if start == addr(10) && end == addr(1)
    ));
    assert_eq!(prober.calls(), 0);
}

#[tokio::test]
async fn malformed_bound_is_rejected_before_probing() {
    let prober = Arc::new(ScriptedProber::new([]));
    let service =
        SweepService::without_resolver(AddressRangeScanner::new(prober.clone(), settings(4)));

    let err = service
        .run_bounds("192.168.1.1", "192.168.1.300", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SweepError::InvalidAddress(_)));
    assert_eq!(prober.calls(), 0);
}

#[tokio::test]
async fn single_address_range() {
    let prober = Arc::new(ScriptedProber::new([addr(7)]));
    let service =
        SweepService::without_resolver(AddressRangeScanner::new(prober.clone(), settings(16)));

    let records = service
        .run(Ipv4Range::single(addr(7)), &CancellationToken::new())
        .await;

    assert_eq!(discovery::addresses(&records), vec![addr(7)]);
    assert_eq!(records[0].name, HostName::Unresolved);
    assert_eq!(prober.calls(), 1);
}

#[tokio::test]
async fn in_flight_probes_never_exceed_cap() {
    let prober = Arc::new(ScriptedProber::with_delay([], Duration::from_millis(3)));
    let service =
        SweepService::without_resolver(AddressRangeScanner::new(prober.clone(), settings(5)));

    let records = service
        .run_bounds("10.1.0.1", "10.1.0.64", &CancellationToken::new())
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(prober.calls(), 64);
    assert!(prober.peak() <= 5, "peak was {}", prober.peak());
}

#[tokio::test]
async fn results_are_in_ascending_numeric_order() {
    let up = [addr(200), addr(9), addr(100), addr(20), addr(2)];
    let prober = Arc::new(ScriptedProber::new(up));
    let service =
        SweepService::without_resolver(AddressRangeScanner::new(prober, settings(64)));

    let records = service
        .run_bounds("192.168.1.1", "192.168.1.254", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        discovery::addresses(&records),
        vec![addr(2), addr(9), addr(20), addr(100), addr(200)]
    );
}

#[tokio::test]
async fn repeated_sweeps_agree() {
    let up = [addr(1), addr(3), addr(20)];
    let neighbors = || StaticNeighbors::named(&[(addr(1), "router"), (addr(3), "printer")]);

    let first = SweepService::new(
        AddressRangeScanner::new(Arc::new(ScriptedProber::new(up)), settings(3)),
        offline_resolver(neighbors()),
    )
    .run_bounds("192.168.1.1", "192.168.1.30", &CancellationToken::new())
    .await
    .unwrap();
    let second = SweepService::new(
        AddressRangeScanner::new(Arc::new(ScriptedProber::new(up)), settings(3)),
        offline_resolver(neighbors()),
    )
    .run_bounds("192.168.1.1", "192.168.1.30", &CancellationToken::new())
    .await
    .unwrap();

    assert_eq!(first, second);
    assert_eq!(first[2].name.to_string(), "desk (this machine)");
}

#[tokio::test]
async fn cancelled_sweep_reports_nothing_further() {
    let prober = Arc::new(ScriptedProber::new([addr(1)]));
    let service = SweepService::new(
        AddressRangeScanner::new(prober.clone(), settings(4)),
        offline_resolver(StaticNeighbors::default()),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    let records = service
        .run_bounds("192.168.1.1", "192.168.1.254", &cancel)
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(prober.calls(), 0);
}
