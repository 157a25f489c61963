use colored::*;
use sweepr_common::log::SUCCESS_TARGET;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

use super::print::PRINT_TARGET;
use super::spinner::SpinnerWriter;

const ENV_FILTER: &str = "SWEEPR_LOG";

pub struct SweeprFormatter;

impl<S, N> FormatEvent<S, N> for SweeprFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if meta.target() == PRINT_TARGET {
            let mut raw = RawMessage::default();
            event.record(&mut raw);
            return writeln!(writer, "{}", raw.0);
        }

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
            match *meta.level() {
                _ if meta.target() == SUCCESS_TARGET => ("[✓]", |s| s.bright_green().bold()),
                Level::TRACE => ("[ ]", |s| s.dimmed()),
                Level::DEBUG => ("[?]", |s| s.blue()),
                Level::INFO => ("[+]", |s| s.green().bold()),
                Level::WARN => ("[*]", |s| s.yellow().bold()),
                Level::ERROR => ("[-]", |s| s.red().bold()),
            };

        write!(writer, "{} ", color_func(symbol.into()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Pulls the `raw_msg` field out of a print event.
#[derive(Default)]
struct RawMessage(String);

impl Visit for RawMessage {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "raw_msg" {
            self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "raw_msg" {
            self.0 = format!("{value:?}");
        }
    }
}

fn default_directive(verbose: u8, quiet: u8) -> &'static str {
    match (verbose, quiet) {
        (_, q) if q > 1 => "error",
        (_, 1) => "warn",
        (0, _) => "info",
        (1, _) => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. `SWEEPR_LOG` overrides the `-v`/`-q`
/// derived level; print output is always let through.
pub fn init_logging(verbose: u8, quiet: u8) {
    let base = std::env::var(ENV_FILTER)
        .unwrap_or_else(|_| default_directive(verbose, quiet).to_string());
    let filter = EnvFilter::try_new(format!("{base},{PRINT_TARGET}=info"))
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{PRINT_TARGET}=info")));

    tracing_subscriber::fmt()
        .event_format(SweeprFormatter)
        .with_env_filter(filter)
        .with_writer(|| SpinnerWriter)
        .init();
}
