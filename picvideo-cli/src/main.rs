// picvideo-cli/src/main.rs
//
// Entry point of the `picvideo` binary.
//
// Parses arguments, installs logging, dispatches to the subcommand and maps
// its outcome onto the process exit code.

use clap::Parser;
use picvideo_cli::{Cli, Commands, logging, run_check, run_create, run_preview, terminal};

use std::process;

fn main() {
    let cli = Cli::parse();

    let log_dir = match &cli.command {
        Commands::Create(args) => args.log_dir.clone(),
        _ => None,
    };
    match logging::init_logging(cli.verbose, log_dir.as_deref()) {
        Ok(Some(path)) => log::info!("Run log: {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            terminal::print_error(&e.to_string());
            process::exit(1);
        }
    }

    let result = match cli.command {
        Commands::Create(args) => run_create(args).map(|_| ()),
        Commands::Preview(args) => run_preview(args).map(|_| ()),
        Commands::Check(args) => run_check(args),
    };

    if let Err(e) = result {
        log::debug!("Command failed: {:?}", e);
        terminal::print_error(&e.to_string());
        process::exit(1);
    }
}
