mod commands;
mod terminal;

use commands::{CommandLine, Commands, info, resolve, sweep};
use sweepr_common::warn;
use sweepr_core::CancellationToken;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);
    print::banner(commands.quiet);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing early");
            ctrl_c.cancel();
        }
    });

    let cfg = commands.base_config();
    match &commands.command {
        Commands::Info => info::info(&cfg),
        Commands::Sweep(args) => {
            let cfg = args.apply(cfg);
            print::header("getting ready for the sweep", cfg.quiet);
            sweep::sweep(args, &cfg, cancel).await
        }
        Commands::Resolve(args) => {
            let cfg = args.apply(cfg);
            resolve::resolve(args, &cfg, cancel).await
        }
    }
}
