// reelscope-cli/src/commands/stages.rs
//
// The `visual` and `audio` subcommands: one analysis stage each.

use crate::cli::{GlobalArgs, VideoArgs};
use crate::commands::prepare;
use crate::error::CliResult;
use crate::output;
use reelscope_core::{analyze_audio, analyze_visual};

pub fn run_visual(args: VideoArgs, global: &GlobalArgs) -> CliResult<()> {
    let config = prepare(global, &args.input)?;

    let spinner = output::start_spinner("Measuring picture quality", !global.json);
    let result = analyze_visual(&args.input, &config);
    spinner.finish_and_clear();
    let visual = result?;

    if global.json {
        output::print_json(&visual)
    } else {
        output::print_visual(&visual);
        Ok(())
    }
}

pub fn run_audio(args: VideoArgs, global: &GlobalArgs) -> CliResult<()> {
    let config = prepare(global, &args.input)?;

    let spinner = output::start_spinner("Measuring sound quality", !global.json);
    let audio = analyze_audio(&args.input, &config);
    spinner.finish_and_clear();

    if global.json {
        output::print_json(&audio)
    } else {
        output::print_audio(&audio);
        Ok(())
    }
}
