use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use sweepr_common::network::host::{HostName, LocalIdentity, ProbeResult, Strategy};
use sweepr_core::CancellationToken;
use sweepr_core::neighbor::{NeighborEntry, NeighborState};
use sweepr_core::resolver::{ArpStrategy, HostnameResolver, ResolveStrategy, SelfCheckStrategy};

use crate::fakes::{AddressBook, StaticNeighbors, Unavailable};

const DESK: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 20);
const NAS: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 50);
const TIMEOUT: Duration = Duration::from_millis(100);

fn identity() -> LocalIdentity {
    LocalIdentity::new("desk", [DESK])
}

#[tokio::test]
async fn only_reverse_dns_answers() {
    let netbios = AddressBook::empty(Strategy::NetBios);
    let mdns = AddressBook::new(Strategy::Mdns, &[(NAS, "nas-mdns")]);
    let (netbios_log, mdns_log) = (netbios.journal(), mdns.journal());

    let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
        Box::new(SelfCheckStrategy::new(identity())),
        Box::new(netbios),
        Box::new(AddressBook::new(Strategy::ReverseDns, &[(NAS, "nas.example.lan")])),
        Box::new(mdns),
        Box::new(ArpStrategy::new(Arc::new(StaticNeighbors::named(&[(NAS, "nas")])))),
    ];
    let resolver = HostnameResolver::new(strategies, TIMEOUT);

    let name = resolver.resolve(NAS).await;

    assert_eq!(name, HostName::resolved("nas.example.lan", Strategy::ReverseDns));
    assert_eq!(name.to_string(), "nas.example.lan");
    assert_eq!(netbios_log.entries(), vec![NAS]);
    assert!(mdns_log.entries().is_empty());
}

#[tokio::test]
async fn own_address_wins_over_every_other_strategy() {
    let netbios = AddressBook::new(Strategy::NetBios, &[(DESK, "DESK-NB")]);
    let netbios_log = netbios.journal();
    let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
        Box::new(AddressBook::new(Strategy::ReverseDns, &[(DESK, "desk.lan")])),
        Box::new(netbios),
        Box::new(SelfCheckStrategy::new(identity())),
    ];
    let resolver = HostnameResolver::new(strategies, TIMEOUT);

    let name = resolver.resolve(DESK).await;

    assert_eq!(name.to_string(), "desk (this machine)");
    assert!(netbios_log.entries().is_empty());
}

#[tokio::test]
async fn broken_tools_fall_through_to_arp() {
    let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
        Box::new(SelfCheckStrategy::new(identity())),
        Box::new(Unavailable(Strategy::NetBios)),
        Box::new(Unavailable(Strategy::ReverseDns)),
        Box::new(Unavailable(Strategy::Mdns)),
        Box::new(ArpStrategy::new(Arc::new(StaticNeighbors::named(&[(NAS, "nas")])))),
    ];
    let resolver = HostnameResolver::new(strategies, TIMEOUT);

    assert_eq!(resolver.resolve(NAS).await.to_string(), "nas (arp)");
}

#[tokio::test]
async fn incomplete_neighbor_entry_is_not_a_name() {
    let neighbors = StaticNeighbors(vec![NeighborEntry {
        addr: NAS,
        name: Some("nas".to_string()),
        mac: None,
        state: NeighborState::Incomplete,
    }]);
    let resolver = HostnameResolver::new(
        vec![Box::new(ArpStrategy::new(Arc::new(neighbors)))],
        TIMEOUT,
    );

    assert_eq!(resolver.resolve(NAS).await, HostName::Unresolved);
}

#[tokio::test]
async fn batch_keeps_order_and_latency() {
    let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
        Box::new(SelfCheckStrategy::new(identity())),
        Box::new(AddressBook::new(Strategy::ReverseDns, &[(NAS, "nas.lan")])),
    ];
    let resolver = HostnameResolver::new(strategies, TIMEOUT);
    let stranger = Ipv4Addr::new(10, 0, 0, 99);
    let live = [
        ProbeResult::alive(DESK, Duration::from_millis(1)),
        ProbeResult::alive(NAS, Duration::from_millis(4)),
        ProbeResult::alive(stranger, Duration::from_millis(9)),
    ];

    let records = resolver.resolve_all(&live, &CancellationToken::new()).await;

    let names: Vec<String> = records.iter().map(|r| r.name.to_string()).collect();
    assert_eq!(names, ["desk (this machine)", "nas.lan", "unresolved"]);
    assert_eq!(records[2].addr, stranger);
    assert_eq!(records[1].latency, Some(Duration::from_millis(4)));
}

#[tokio::test]
async fn escape_sequences_never_reach_the_table() {
    let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
        Box::new(SelfCheckStrategy::new(identity())),
        Box::new(AddressBook::new(Strategy::NetBios, &[(NAS, "\x1b[2J\x1b[31mPWN")])),
        Box::new(AddressBook::new(Strategy::ReverseDns, &[(NAS, "nas.lan")])),
    ];
    let resolver = HostnameResolver::new(strategies, TIMEOUT);

    let name = resolver.resolve(NAS).await;

    assert_eq!(name, HostName::resolved("nas.lan", Strategy::ReverseDns));
    assert!(!name.to_string().contains('\x1b'));
}
