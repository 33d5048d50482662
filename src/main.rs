//! printkit - preset installer for Klipper printer boards
//!
//! Copies preset configuration files, an init.d service, and patched
//! scripts onto a 3D-printer control board running a Klipper/Moonraker
//! firmware stack. Once a run completes the installer's job is over; the
//! printer runs unmodified third-party software plus the installed files.

use clap::Parser;

mod cli;
mod commands;
mod components;
mod context;
mod error;
mod fsops;
mod orchestrator;
mod patch;
mod progress;
mod registry;
mod ui;

use cli::{Cli, Commands};

/// Exit codes: 0 all attempted components succeeded, 1 at least one failed,
/// 2 configuration/environment error before anything was attempted
fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(cli.verbose, args),
        Commands::Verify(args) => commands::verify::run(cli.verbose, args),
        Commands::List => commands::list::run().map(|()| true),
        Commands::Version => commands::version::run().map(|()| true),
        Commands::Completions(args) => commands::completions::run(args).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
