use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;
use sweepr_common::config::Config;
use sweepr_common::network::host::ResolutionRecord;
use sweepr_common::network::target::Target;
use sweepr_common::{info, success, warn};
use sweepr_core::CancellationToken;
use sweepr_core::discovery::SweepService;
use sweepr_core::resolver::HostnameResolver;
use sweepr_core::scanner::{AddressRangeScanner, ScanSettings};
use sweepr_core::system;

use crate::commands::SweepArgs;
use crate::mprint;
use crate::terminal::input::QuitListener;
use crate::terminal::{colors, print, spinner};

pub async fn sweep(args: &SweepArgs, cfg: &Config, cancel: CancellationToken) -> anyhow::Result<()> {
    cfg.validate()?;

    let target: Target = match &args.end {
        Some(end) => Target::from_bounds(&args.start, end)?,
        None => args.start.parse::<Target>()?,
    };
    let range = target.into_range()?;

    let unit: &str = if range.len() == 1 { "address" } else { "addresses" };
    info!(
        "Sweeping {} {unit} from {} to {}",
        range.len(),
        range.start(),
        range.end()
    );

    let prober = system::default_prober(cfg);
    let pb = spinner::start_sweep_progress(range.len(), cfg.quiet, !cfg.disable_input);
    let progress = pb.clone();
    let resolving = !cfg.no_resolve;
    let scanner = AddressRangeScanner::new(prober, ScanSettings::from(cfg)).with_progress(
        Arc::new(move |done, total| {
            progress.set_position(done);
            if done == total && resolving {
                progress.set_message("resolving live hosts...");
            }
        }),
    );

    let service = if cfg.no_resolve {
        SweepService::without_resolver(scanner)
    } else {
        let identity = system::detect_local_identity();
        SweepService::new(scanner, HostnameResolver::system(identity, cfg.resolve_timeout))
    };

    let listener = if cfg.disable_input {
        None
    } else {
        QuitListener::spawn(cancel.clone())
    };

    let start_time: Instant = Instant::now();
    let records: Vec<ResolutionRecord> = service.run(range, &cancel).await;

    drop(listener);
    spinner::finish();

    if cancel.is_cancelled() {
        warn!("Sweep was interrupted, results are partial");
    }

    sweep_ends(&records, start_time.elapsed(), cfg);
    Ok(())
}

fn sweep_ends(records: &[ResolutionRecord], total_time: Duration, cfg: &Config) {
    if records.is_empty() {
        print::header("zero hosts detected", cfg.quiet);
        print::no_results();
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("sweep results", cfg.quiet);
    print::record_table(records, cfg.quiet == 0);
    print_summary(records, total_time, cfg);
}

fn print_summary(records: &[ResolutionRecord], total_time: Duration, cfg: &Config) {
    let named: usize = records.iter().filter(|r| r.name.is_resolved()).count();
    let active_hosts: ColoredString = format!("{} live hosts", records.len()).bold().green();
    let named_hosts: ColoredString = format!("{named} named").bold().cyan();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Sweep Complete: {active_hosts}, {named_hosts} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        1 => {
            mprint!();
            success!("{}", output)
        }
        _ => {}
    }
}
