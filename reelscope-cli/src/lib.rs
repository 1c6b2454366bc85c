// reelscope-cli/src/lib.rs
//
// Library portion of the reelscope CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, GlobalArgs};
pub use error::{CliErrorContext, CliResult};

/// Dispatches a parsed command line.
pub fn run(cli: Cli) -> CliResult<()> {
    let Cli { command, global } = cli;
    match command {
        Commands::Analyze(args) => commands::run_analyze(args, &global),
        Commands::Visual(args) => commands::run_visual(args, &global),
        Commands::Audio(args) => commands::run_audio(args, &global),
        Commands::Thumbnails(args) => commands::run_thumbnails(args, &global),
    }
}

/// Short name of a command, used in log file names.
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Analyze(_) => "analyze",
        Commands::Visual(_) => "visual",
        Commands::Audio(_) => "audio",
        Commands::Thumbnails(_) => "thumbnails",
    }
}
