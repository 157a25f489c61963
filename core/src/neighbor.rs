//! Access to the operating system's ARP / neighbor cache.
//!
//! The cache is only reachable through platform tools whose output differs per
//! OS, so reading it sits behind [`NeighborTable`]. [`ArpCommand`] runs
//! `arp -a` and understands both the BSD/Linux layout
//!
//! ```text
//! router (192.168.1.1) at aa:bb:cc:dd:ee:ff [ether] on eth0
//! ? (192.168.1.7) at <incomplete> on eth0
//! ```
//!
//! and the Windows layout
//!
//! ```text
//!   192.168.1.1           aa-bb-cc-dd-ee-ff     dynamic
//! ```

use std::net::Ipv4Addr;
use std::process::Stdio;
use std::str::FromStr;

use anyhow::{Context, ensure};
use async_trait::async_trait;
use pnet::util::MacAddr;
use tokio::process::Command;

/// Spellings of an unfinished resolution seen across platforms.
const INCOMPLETE_MARKERS: &[&str] = &["<incomplete>", "(incomplete)", "incomplete"];
/// Name printed when the tool could not name the neighbor.
const PLACEHOLDER_NAMES: &[&str] = &["?", "*"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborState {
    Reachable,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborEntry {
    pub addr: Ipv4Addr,
    pub name: Option<String>,
    pub mac: Option<MacAddr>,
    pub state: NeighborState,
}

impl NeighborEntry {
    /// A name worth showing: present, not a placeholder, and backed by a
    /// resolved link-layer address.
    pub fn usable_name(&self) -> Option<&str> {
        if self.state == NeighborState::Incomplete {
            return None;
        }
        self.name.as_deref()
    }
}

#[async_trait]
pub trait NeighborTable: Send + Sync {
    async fn entries(&self) -> anyhow::Result<Vec<NeighborEntry>>;
}

/// Reads the cache through `arp -a`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArpCommand;

#[async_trait]
impl NeighborTable for ArpCommand {
    async fn entries(&self) -> anyhow::Result<Vec<NeighborEntry>> {
        let mut cmd = Command::new("arp");
        cmd.arg("-a");
        let stdout = capture(cmd).await.context("running arp -a")?;
        Ok(parse_arp_output(&stdout))
    }
}

/// Runs `cmd` to completion and returns its stdout.
///
/// The child is killed if the returned future is dropped, which is what the
/// resolver's per-strategy timeout does to a slow `arp`.
async fn capture(mut cmd: Command) -> anyhow::Result<String> {
    let output = cmd
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await?;
    ensure!(output.status.success(), "exited with {}", output.status);
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parses `arp -a` output in any of the supported layouts. Lines that match
/// neither are skipped.
pub fn parse_arp_output(output: &str) -> Vec<NeighborEntry> {
    output
        .lines()
        .filter_map(|line| parse_bsd_line(line).or_else(|| parse_windows_line(line)))
        .collect()
}

/// `name (a.b.c.d) at hwaddr ...`
fn parse_bsd_line(line: &str) -> Option<NeighborEntry> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    let addr = tokens
        .next()?
        .strip_prefix('(')?
        .strip_suffix(')')?
        .parse::<Ipv4Addr>()
        .ok()?;
    if tokens.next()? != "at" {
        return None;
    }
    let hw = tokens.next().unwrap_or("");
    let (mac, state) = link_layer_state(hw);

    Some(NeighborEntry {
        addr,
        name: clean_name(name),
        mac,
        state,
    })
}

/// `a.b.c.d  aa-bb-cc-dd-ee-ff  dynamic`
fn parse_windows_line(line: &str) -> Option<NeighborEntry> {
    let mut tokens = line.split_whitespace();
    let addr = tokens.next()?.parse::<Ipv4Addr>().ok()?;
    let hw = tokens.next()?;
    let kind = tokens.next()?;
    if !matches!(kind, "dynamic" | "static" | "invalid") {
        return None;
    }
    let (mac, mut state) = link_layer_state(hw);
    if kind == "invalid" {
        state = NeighborState::Incomplete;
    }

    Some(NeighborEntry {
        addr,
        name: None,
        mac,
        state,
    })
}

fn link_layer_state(hw: &str) -> (Option<MacAddr>, NeighborState) {
    if INCOMPLETE_MARKERS
        .iter()
        .any(|marker| hw.eq_ignore_ascii_case(marker))
    {
        return (None, NeighborState::Incomplete);
    }
    match MacAddr::from_str(&hw.replace('-', ":")) {
        Ok(mac) if mac == MacAddr::zero() => (Some(mac), NeighborState::Incomplete),
        Ok(mac) => (Some(mac), NeighborState::Reachable),
        Err(_) => (None, NeighborState::Incomplete),
    }
}

fn clean_name(name: &str) -> Option<String> {
    let name = name.trim().trim_end_matches('.');
    if name.is_empty() || PLACEHOLDER_NAMES.contains(&name) {
        return None;
    }
    Some(name.to_string())
}
