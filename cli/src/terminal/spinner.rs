use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

const TIP: &str = "press 'q' to finish early";

/// The bar currently owning the terminal, if any. Log lines are routed
/// through it so they do not tear the bar.
static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn with_active<R>(f: impl FnOnce(&Option<ProgressBar>) -> R) -> R {
    match ACTIVE.lock() {
        Ok(guard) => f(&guard),
        Err(poisoned) => f(&poisoned.into_inner()),
    }
}

/// Shows a progress bar for a sweep of `total` probes.
pub fn start_sweep_progress(total: u64, quiet: u8, show_tip: bool) -> ProgressBar {
    let pb = if quiet > 0 {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total)
    };

    let style = ProgressStyle::with_template(
        "{spinner:.blue} [{bar:32.green/bright_black}] {pos}/{len} probes {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━╸─")
    .tick_strings(&[
        "▁▁▁▁▁", "▁▂▂▂▁", "▁▄▂▄▁", "▂▄▆▄▂", "▄▆█▆▄", "▂▄▆▄▂", "▁▄▂▄▁", "▁▂▂▂▁",
    ]);

    pb.set_style(style);
    if show_tip {
        pb.set_message(format!("{}", TIP.italic().white()));
    }
    pb.enable_steady_tick(Duration::from_millis(100));

    if let Ok(mut active) = ACTIVE.lock() {
        *active = Some(pb.clone());
    }
    pb
}

/// Shows a spinner while live hosts are being named.
pub fn start_resolve_spinner(total: usize, quiet: u8) -> ProgressBar {
    let pb = if quiet > 0 {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!(
        "Resolving {} addresses...",
        total.to_string().green().bold()
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    if let Ok(mut active) = ACTIVE.lock() {
        *active = Some(pb.clone());
    }
    pb
}

pub fn finish() {
    if let Ok(mut active) = ACTIVE.lock() {
        if let Some(pb) = active.take() {
            pb.finish_and_clear();
        }
    }
}

pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf);
        let msg = msg.trim_end_matches('\n');
        let routed = with_active(|active| match active {
            Some(pb) if !pb.is_hidden() && !pb.is_finished() => {
                pb.println(msg);
                true
            }
            _ => false,
        });
        if !routed {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(msg.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()
    }
}
