// reelscope-cli/src/commands/analyze.rs
//
// The `analyze` subcommand: every stage, merged into one report.

use crate::cli::{AnalyzeArgs, GlobalArgs};
use crate::commands::prepare;
use crate::error::CliResult;
use crate::output;
use reelscope_core::file_logging::log_report_summary;
use reelscope_core::{DisabledTranscriber, RuleBasedSuggestions, analyze_reel};
use std::time::Instant;

pub fn run_analyze(args: AnalyzeArgs, global: &GlobalArgs) -> CliResult<()> {
    let config = prepare(global, &args.input)?;
    let start = Instant::now();

    let spinner = output::start_spinner(
        &format!("Analyzing {} for {}", args.input.display(), args.platform.display_name()),
        !global.json,
    );
    let result = analyze_reel(
        &args.input,
        args.platform,
        &config,
        &DisabledTranscriber,
        &RuleBasedSuggestions,
    );
    spinner.finish_and_clear();
    let report = result?;

    log_report_summary(&report);

    if global.json {
        output::print_json(&report)?;
    } else {
        output::print_report(&report);
        println!();
        output::print_success(&format!(
            "Analysis finished in {:.1}s",
            start.elapsed().as_secs_f64()
        ));
    }
    Ok(())
}
