use colored::*;
use pnet::datalink::{self, NetworkInterface};
use sweepr_common::config::Config;
use sweepr_core::system;

use crate::terminal::{colors, network_fmt, print};

pub fn info(cfg: &Config) -> anyhow::Result<()> {
    let identity = system::detect_local_identity();

    print::header("local identity", cfg.quiet);
    let privileged: ColoredString = if system::is_privileged() {
        "yes (native ICMP)".green()
    } else {
        "no (system ping fallback)".yellow()
    };
    let addrs: String = identity
        .addrs
        .iter()
        .map(|addr| addr.to_string())
        .collect::<Vec<String>>()
        .join(", ");
    print::as_tree_one_level(vec![
        ("Hostname".to_string(), identity.hostname.color(colors::PRIMARY)),
        ("Addresses".to_string(), addrs.color(colors::IPV4_ADDR)),
        ("Root".to_string(), privileged),
    ]);

    let interfaces: Vec<NetworkInterface> = datalink::interfaces()
        .into_iter()
        .filter(|i| i.is_up() && i.ips.iter().any(|net| net.is_ipv4()))
        .collect();

    print::header("interfaces", cfg.quiet);
    if interfaces.is_empty() {
        print::print_status("No IPv4 interface is up");
    }
    for (idx, interface) in interfaces.iter().enumerate() {
        network_fmt::print_interface(interface, idx);
    }
    Ok(())
}
