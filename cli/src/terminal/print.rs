use colored::*;
use sweepr_common::network::host::{HostName, ResolutionRecord};
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "sweepr::print";

const ADDR_HEADER: &str = "ADDRESS";
const NAME_HEADER: &str = "NAME";
const RTT_HEADER: &str = "RTT";

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn banner(q_level: u8) {
    if q_level > 0 {
        return;
    }

    let text_content: String = format!("⟦ SWEEPR v{} ⟧", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═"
        .repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2)
        .bright_black();
    print(&format!("{sep}{text}{sep}"));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    let message: String = format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT));
    print(&message);
}

pub fn tree_head(idx: usize, name: &str) {
    let idx_str: String = format!("[{}]", idx.to_string().color(colors::ACCENT));
    let output: String = format!(
        "{} {}",
        idx_str.color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    );
    print(&output);
}

pub fn as_tree_one_level(key_value_pair: Vec<(String, ColoredString)>) {
    let key_width: usize = key_value_pair
        .iter()
        .map(|(key, _)| key.len())
        .max()
        .unwrap_or(0);
    for (i, (key, value)) in key_value_pair.iter().enumerate() {
        let last: bool = i + 1 == key_value_pair.len();
        let branch: ColoredString = if !last {
            "├─".bright_black()
        } else {
            "└─".bright_black()
        };
        let output: String = format!(
            " {} {}{}{} {}",
            branch,
            key.color(colors::TEXT_DEFAULT),
            ".".repeat(key_width + 1 - key.len()).color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        );
        print(&output);
    }
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

pub fn no_results() {
    centerln(&format!("{}", "no host answered".red().bold()));
}

fn colored_name(name: &HostName) -> ColoredString {
    match name {
        HostName::Resolved { name, source } => match source.tag() {
            Some(tag) => format!("{} {}", name, format!("({tag})").color(colors::TAG)).normal(),
            None => name.as_str().normal(),
        },
        HostName::Unresolved => name.to_string().color(colors::UNRESOLVED),
    }
}

/// Renders records as an aligned address / name table, in the order given.
pub fn record_table(records: &[ResolutionRecord], show_latency: bool) {
    let addr_width: usize = records
        .iter()
        .map(|r| r.addr.to_string().len())
        .chain(std::iter::once(ADDR_HEADER.len()))
        .max()
        .unwrap_or(ADDR_HEADER.len());
    let name_width: usize = records
        .iter()
        .map(|r| UnicodeWidthStr::width(r.name.to_string().as_str()))
        .chain(std::iter::once(NAME_HEADER.len()))
        .max()
        .unwrap_or(NAME_HEADER.len());

    let mut head = format!("{ADDR_HEADER:<addr_width$}  {NAME_HEADER}");
    if show_latency {
        let pad = name_width - NAME_HEADER.len();
        head.push_str(&format!("{}  {RTT_HEADER}", " ".repeat(pad)));
    }
    print(&format!("{}", head.bold()));

    for record in records {
        let addr = format!("{:<addr_width$}", record.addr.to_string());
        let plain_name = record.name.to_string();
        let mut line = format!(
            "{}  {}",
            addr.color(colors::IPV4_ADDR),
            colored_name(&record.name)
        );
        if show_latency {
            let pad = name_width - UnicodeWidthStr::width(plain_name.as_str());
            let rtt = record
                .latency
                .map(|l| format!("{:.1}ms", l.as_secs_f64() * 1_000.0))
                .unwrap_or_else(|| "-".to_string());
            line.push_str(&format!("{}  {}", " ".repeat(pad), rtt.color(colors::SEPARATOR)));
        }
        print(&line);
    }
}
