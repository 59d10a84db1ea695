use anyhow::Result;
use clap::Parser;
use sidebar_sync::cli::{self, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Routes log::info!() etc. to the debug log file; mirrors to stderr when RUST_LOG is set.
    sidebar_sync::debug::init_log_bridge(cli.log_level.map(|l| l.as_debug_level()));
    log::info!("Starting sidebar-sync {}", sidebar_sync::VERSION);

    if let Err(e) = cli::run(&cli) {
        eprintln!("sidebar-sync: error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
