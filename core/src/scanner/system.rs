use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use sweepr_common::debug;
use sweepr_common::network::host::ProbeResult;
use tokio::process::Command;
use tokio::time::Instant;

use super::Prober;

/// Extra time granted to the `ping` process on top of its own deadline.
const SPAWN_GRACE: Duration = Duration::from_millis(500);

/// Prober that runs the platform `ping` utility once per address.
///
/// Needs no raw-socket privileges. Reported latency includes process start-up.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPingProber;

#[async_trait]
impl Prober for SystemPingProber {
    async fn probe(&self, addr: Ipv4Addr, timeout: Duration) -> ProbeResult {
        let started = Instant::now();
        let mut cmd = Command::new("ping");
        cmd.args(ping_args(addr, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(timeout + SPAWN_GRACE, cmd.status()).await {
            Ok(Ok(status)) if status.success() => ProbeResult::alive(addr, started.elapsed()),
            Ok(Ok(_)) | Err(_) => ProbeResult::down(addr),
            Ok(Err(e)) => {
                debug!("Could not run ping for {addr}: {e}");
                ProbeResult::down(addr)
            }
        }
    }
}

#[cfg(target_os = "windows")]
fn ping_args(addr: Ipv4Addr, timeout: Duration) -> Vec<String> {
    vec![
        "-n".into(),
        "1".into(),
        "-w".into(),
        timeout.as_millis().max(1).to_string(),
        addr.to_string(),
    ]
}

#[cfg(target_os = "macos")]
fn ping_args(addr: Ipv4Addr, timeout: Duration) -> Vec<String> {
    vec![
        "-c".into(),
        "1".into(),
        "-W".into(),
        timeout.as_millis().max(1).to_string(),
        addr.to_string(),
    ]
}

/// iputils and busybox take whole seconds.
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn ping_args(addr: Ipv4Addr, timeout: Duration) -> Vec<String> {
    let secs = timeout.as_millis().div_ceil(1000).max(1);
    vec![
        "-c".into(),
        "1".into(),
        "-W".into(),
        secs.to_string(),
        addr.to_string(),
    ]
}
