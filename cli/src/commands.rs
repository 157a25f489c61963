pub mod info;
pub mod resolve;
pub mod sweep;

use std::net::Ipv4Addr;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use sweepr_common::config::{self, Config};

#[derive(Parser)]
#[command(name = "sweepr")]
#[command(version, about = "Ping sweep an IPv4 range and name every host that answers.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Less output; repeat to print only the result table
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// More log output; repeat for trace level
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Do not listen for the 'q' key during a sweep
    #[arg(long, global = true)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sweep a range and resolve every live host
    #[command(alias = "s")]
    Sweep(SweepArgs),
    /// Run only the resolver chain against the given addresses
    #[command(alias = "r")]
    Resolve(ResolveArgs),
    /// Show this machine's identity as the resolver sees it
    #[command(alias = "i")]
    Info,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Start address, or a whole target: `10.0.0.1-50`, `10.0.0.0/24`, `lan`
    pub start: String,

    /// End address (inclusive)
    pub end: Option<String>,

    /// Maximum number of probes in flight
    #[arg(short, long, default_value_t = config::DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-probe timeout in milliseconds
    #[arg(short, long, default_value_t = config::DEFAULT_PROBE_TIMEOUT.as_millis() as u64)]
    pub timeout: u64,

    /// Delay between probe dispatches in milliseconds
    #[arg(long, default_value_t = 0)]
    pub interval: u64,

    #[command(flatten)]
    pub resolve: ResolveOptions,

    /// Skip name resolution
    #[arg(long)]
    pub no_resolve: bool,

    /// Use the platform `ping` tool instead of ICMP sockets
    #[arg(long)]
    pub system_ping: bool,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Addresses to resolve
    #[arg(required = true)]
    pub addrs: Vec<Ipv4Addr>,

    #[command(flatten)]
    pub resolve: ResolveOptions,
}

#[derive(Args, Debug)]
pub struct ResolveOptions {
    /// Timeout for each resolution strategy in milliseconds
    #[arg(long, default_value_t = config::DEFAULT_RESOLVE_TIMEOUT.as_millis() as u64)]
    pub resolve_timeout: u64,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn base_config(&self) -> Config {
        Config {
            quiet: self.quiet,
            disable_input: self.no_input,
            ..Config::default()
        }
    }
}

impl SweepArgs {
    pub fn apply(&self, mut cfg: Config) -> Config {
        cfg.concurrency = self.concurrency;
        cfg.probe_timeout = Duration::from_millis(self.timeout);
        cfg.interval = Duration::from_millis(self.interval);
        cfg.resolve_timeout = Duration::from_millis(self.resolve.resolve_timeout);
        cfg.no_resolve = self.no_resolve;
        cfg.system_ping = self.system_ping;
        cfg
    }
}

impl ResolveArgs {
    pub fn apply(&self, mut cfg: Config) -> Config {
        cfg.resolve_timeout = Duration::from_millis(self.resolve.resolve_timeout);
        cfg
    }
}
