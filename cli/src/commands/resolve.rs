use sweepr_common::config::Config;
use sweepr_common::network::host::{HostName, ResolutionRecord};
use sweepr_core::CancellationToken;
use sweepr_core::discovery;
use sweepr_core::resolver::HostnameResolver;
use sweepr_core::system;

use crate::commands::ResolveArgs;
use crate::terminal::{print, spinner};

pub async fn resolve(args: &ResolveArgs, cfg: &Config, cancel: CancellationToken) -> anyhow::Result<()> {
    let identity = system::detect_local_identity();
    let resolver = HostnameResolver::system(identity, cfg.resolve_timeout);

    let _pb = spinner::start_resolve_spinner(args.addrs.len(), cfg.quiet);
    let mut records: Vec<ResolutionRecord> = Vec::with_capacity(args.addrs.len());
    for &addr in &args.addrs {
        let name = tokio::select! {
            name = resolver.resolve(addr) => name,
            _ = cancel.cancelled() => HostName::Unresolved,
        };
        records.push(ResolutionRecord::new(addr, name));
    }
    spinner::finish();

    discovery::sort_records(&mut records);
    records.dedup_by_key(|record| record.addr);

    print::header("resolution results", cfg.quiet);
    print::record_table(&records, false);
    Ok(())
}
