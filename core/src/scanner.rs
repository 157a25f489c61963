//! The liveness half of a sweep.
//!
//! [`AddressRangeScanner`] walks an [`Ipv4Range`] and hands every address to a
//! [`Prober`]. At most `concurrency` probes are in flight at any instant; the
//! next address is only dispatched once an earlier probe has finished.
//!
//! Probers are the seam to the operating system. The scanner itself never
//! touches a socket, which keeps it testable with an instrumented fake.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sweepr_common::config::Config;
use sweepr_common::error::SweepError;
use sweepr_common::network::host::ProbeResult;
use sweepr_common::network::range::Ipv4Range;
use sweepr_common::{debug, warn};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

mod icmp;
mod system;

pub use icmp::IcmpProber;
pub use system::SystemPingProber;

/// Sends one echo request and reports whether a reply arrived in time.
///
/// A missing reply is a normal outcome (`alive: false`), never an error. The
/// scanner also cuts every probe off at the timeout, so a prober that answers
/// late still counts as down.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, addr: Ipv4Addr, timeout: Duration) -> ProbeResult;
}

/// Called after every finished probe with `(done, total)`.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub concurrency: usize,
    pub timeout: Duration,
    pub interval: Duration,
}

impl From<&Config> for ScanSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            concurrency: cfg.concurrency,
            timeout: cfg.probe_timeout,
            interval: cfg.interval,
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        ScanSettings::from(&Config::default())
    }
}

pub struct AddressRangeScanner {
    prober: Arc<dyn Prober>,
    settings: ScanSettings,
    on_progress: Option<ProgressCallback>,
}

impl AddressRangeScanner {
    pub fn new(prober: Arc<dyn Prober>, settings: ScanSettings) -> Self {
        Self {
            prober,
            settings,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Validates both bounds before a single probe is sent.
    pub async fn scan_bounds(
        &self,
        start: &str,
        end: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProbeResult>, SweepError> {
        let range = Ipv4Range::parse(start, end)?;
        Ok(self.scan(range, cancel).await)
    }

    /// Probes every address of `range` and returns the live ones, in
    /// completion order.
    ///
    /// Cancelling `cancel` stops dispatch, aborts probes still in flight and
    /// returns the hosts found so far.
    pub async fn scan(&self, range: Ipv4Range, cancel: &CancellationToken) -> Vec<ProbeResult> {
        let total: u64 = range.len();
        let cap: usize = self.settings.concurrency.max(1);
        let mut pending = range.to_iter();
        let mut in_flight: JoinSet<ProbeResult> = JoinSet::new();
        let mut live: Vec<ProbeResult> = Vec::new();
        let mut done: u64 = 0;
        let mut exhausted = false;

        debug!(
            "Probing {total} addresses from {} to {} ({cap} at a time)",
            range.start(),
            range.end()
        );

        loop {
            while !exhausted && in_flight.len() < cap && !cancel.is_cancelled() {
                let Some(addr) = pending.next() else {
                    exhausted = true;
                    break;
                };
                self.dispatch(&mut in_flight, addr);
                self.pause(cancel).await;
            }

            if cancel.is_cancelled() {
                warn!("Sweep cancelled after {done} of {total} probes");
                in_flight.abort_all();
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => continue,
                joined = in_flight.join_next() => match joined {
                    Some(Ok(result)) => {
                        done += 1;
                        if result.alive {
                            live.push(result);
                        }
                        self.report(done, total);
                    }
                    Some(Err(e)) => {
                        done += 1;
                        debug!("Probe task failed: {e}");
                        self.report(done, total);
                    }
                    None => break,
                },
            }
        }

        live
    }

    fn dispatch(&self, in_flight: &mut JoinSet<ProbeResult>, addr: Ipv4Addr) {
        let prober = Arc::clone(&self.prober);
        let timeout = self.settings.timeout;
        in_flight.spawn(async move {
            tokio::time::timeout(timeout, prober.probe(addr, timeout))
                .await
                .unwrap_or_else(|_| ProbeResult::down(addr))
        });
    }

    async fn pause(&self, cancel: &CancellationToken) {
        if self.settings.interval.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.settings.interval) => {}
            _ = cancel.cancelled() => {}
        }
    }

    fn report(&self, done: u64, total: u64) {
        if let Some(cb) = &self.on_progress {
            cb(done, total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use tokio::time::Instant;

    struct FakeProber {
        up: HashSet<Ipv4Addr>,
        calls: AtomicUsize,
        started: Mutex<Vec<Instant>>,
        outstanding: AtomicUsize,
        peak: AtomicUsize,
        delay: Duration,
    }

    impl FakeProber {
        fn new(up: &[Ipv4Addr], delay: Duration) -> Self {
            Self {
                up: up.iter().copied().collect(),
                calls: AtomicUsize::new(0),
                started: Mutex::new(Vec::new()),
                outstanding: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                delay,
            }
        }
    }

    #[async_trait]
    impl Prober for FakeProber {
        async fn probe(&self, addr: Ipv4Addr, _timeout: Duration) -> ProbeResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.lock().unwrap().push(Instant::now());
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

    fn settings(concurrency: usize) -> ScanSettings {
        ScanSettings {
            concurrency,
            timeout: Duration::from_millis(50),
            interval: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn only_live_hosts_are_returned() {
        let up = [Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(10, 0, 0, 4)];
        let prober = Arc::new(FakeProber::new(&up, Duration::from_millis(1)));
        let scanner = AddressRangeScanner::new(prober.clone(), settings(8));

        let range = Ipv4Range::parse("10.0.0.1", "10.0.0.5").unwrap();
        let mut live: Vec<Ipv4Addr> = scanner
            .scan(range, &CancellationToken::new())
            .await
            .into_iter()
            .map(|p| p.addr)
            .collect();
        live.sort();

        assert_eq!(live, up.to_vec());
        assert_eq!(prober.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn reversed_bounds_send_nothing() {
        let prober = Arc::new(FakeProber::new(&[], Duration::ZERO));
        let scanner = AddressRangeScanner::new(prober.clone(), settings(4));

        let err = scanner
            .scan_bounds("10.0.0.9", "10.0.0.1", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SweepError::InvalidRange { .. }));
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrency_cap_is_respected() {
        let prober = Arc::new(FakeProber::new(&[], Duration::from_millis(5)));
        let scanner = AddressRangeScanner::new(prober.clone(), settings(3));

        let range = Ipv4Range::parse("10.0.0.1", "10.0.0.40").unwrap();
        scanner.scan(range, &CancellationToken::new()).await;

        assert_eq!(prober.calls.load(Ordering::SeqCst), 40);
        assert!(prober.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn progress_reaches_total() {
        let prober = Arc::new(FakeProber::new(&[], Duration::ZERO));
        let last = Arc::new(AtomicU64::new(0));
        let seen_total = Arc::new(Mutex::new(0u64));
        let (last_ref, total_ref) = (last.clone(), seen_total.clone());

        let scanner = AddressRangeScanner::new(prober, settings(2)).with_progress(Arc::new(
            move |done, total| {
                last_ref.fetch_max(done, Ordering::SeqCst);
                *total_ref.lock().unwrap() = total;
            },
        ));

        let range = Ipv4Range::parse("10.0.0.1", "10.0.0.6").unwrap();
        scanner.scan(range, &CancellationToken::new()).await;

        assert_eq!(last.load(Ordering::SeqCst), 6);
        assert_eq!(*seen_total.lock().unwrap(), 6);
    }

    #[tokio::test]
    async fn cancelled_sweep_stops_dispatching() {
        let prober = Arc::new(FakeProber::new(&[], Duration::from_millis(20)));
        let scanner = AddressRangeScanner::new(prober.clone(), settings(2));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let range = Ipv4Range::parse("10.0.0.1", "10.0.3.255").unwrap();
        let live = scanner.scan(range, &cancel).await;

        assert!(live.is_empty());
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn late_reply_counts_as_down() {
        let up = [Ipv4Addr::new(10, 0, 0, 1)];
        let prober = Arc::new(FakeProber::new(&up, Duration::from_millis(200)));
        let scanner = AddressRangeScanner::new(
            prober.clone(),
            ScanSettings {
                concurrency: 4,
                timeout: Duration::from_millis(20),
                interval: Duration::ZERO,
            },
        );

        let range = Ipv4Range::single(Ipv4Addr::new(10, 0, 0, 1));
        let live = scanner.scan(range, &CancellationToken::new()).await;

        assert!(live.is_empty(), "late reply reported live: {live:?}");
        assert_eq!(prober.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_spaces_out_dispatch() {
        let interval = Duration::from_millis(100);
        let prober = Arc::new(FakeProber::new(&[], Duration::ZERO));
        let scanner = AddressRangeScanner::new(
            prober.clone(),
            ScanSettings {
                concurrency: 16,
                timeout: Duration::from_millis(50),
                interval,
            },
        );

        let range = Ipv4Range::parse("10.0.0.1", "10.0.0.4").unwrap();
        scanner.scan(range, &CancellationToken::new()).await;

        let started = prober.started.lock().unwrap().clone();
        assert_eq!(started.len(), 4);
        for pair in started.windows(2) {
            assert!(
                pair[1] - pair[0] >= interval,
                "probes {:?} apart",
                pair[1] - pair[0]
            );
        }
    }
}
