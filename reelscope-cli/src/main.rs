// reelscope-cli/src/main.rs
//
// Entry point for the `reelscope` binary: parses arguments, installs the
// logger, runs the selected command and maps failures to exit code 1.

use clap::Parser;
use reelscope::output::print_error;
use reelscope::{Cli, command_name, logging, run};
use std::process;

fn main() {
    let cli = Cli::parse();

    let log_file = match logging::init_logging(
        cli.global.verbose,
        cli.global.log_dir.as_deref(),
        command_name(&cli.command),
    ) {
        Ok(path) => path,
        Err(e) => {
            print_error("Logging setup failed", &e.to_string());
            process::exit(1);
        }
    };
    if let Some(path) = &log_file {
        log::info!("reelscope {} started", env!("CARGO_PKG_VERSION"));
        if !cli.global.json {
            eprintln!("Logging to {}", path.display());
        }
    }

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        print_error("Analysis failed", &e.to_string());
        process::exit(1);
    }
}
