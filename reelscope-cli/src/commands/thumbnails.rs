// reelscope-cli/src/commands/thumbnails.rs
//
// The `thumbnails` subcommand: ranked suggestions, optionally written out as
// JPEG files.

use crate::cli::{GlobalArgs, ThumbnailsArgs};
use crate::commands::prepare;
use crate::error::{CliErrorContext, CliResult};
use crate::output;
use reelscope_core::{ThumbnailSuggestion, suggest_thumbnails};
use std::fs;
use std::path::{Path, PathBuf};

pub fn run_thumbnails(args: ThumbnailsArgs, global: &GlobalArgs) -> CliResult<()> {
    let config = prepare(global, &args.input)?;

    let spinner = output::start_spinner(
        &format!("Ranking thumbnails for {}", args.platform.display_name()),
        !global.json,
    );
    let result = suggest_thumbnails(&args.input, args.platform, usize::from(args.count), &config);
    spinner.finish_and_clear();
    let suggestions = result?;

    let saved = match &args.save_dir {
        Some(dir) => save_previews(&suggestions, dir)?,
        None => Vec::new(),
    };

    if global.json {
        return output::print_json(&suggestions);
    }

    output::print_thumbnails(&suggestions);
    if !saved.is_empty() {
        println!();
        for path in &saved {
            output::print_success(&format!("Saved {}", path.display()));
        }
    }
    Ok(())
}

/// File name for the preview of the suggestion at `rank` (1-based).
pub fn preview_file_name(rank: usize, suggestion: &ThumbnailSuggestion) -> String {
    format!("thumbnail_{:02}_{:.1}s.jpg", rank, suggestion.timestamp)
}

/// Writes every preview that could be encoded into `dir`.
pub fn save_previews(suggestions: &[ThumbnailSuggestion], dir: &Path) -> CliResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).cli_with_context(|| format!("Creating {}", dir.display()))?;

    let mut saved = Vec::with_capacity(suggestions.len());
    for (i, suggestion) in suggestions.iter().enumerate() {
        let jpeg = match suggestion.preview_jpeg() {
            Ok(jpeg) => jpeg,
            Err(e) => {
                log::warn!("Skipping preview at {:.1}s: {}", suggestion.timestamp, e);
                continue;
            }
        };
        let path = dir.join(preview_file_name(i + 1, suggestion));
        fs::write(&path, jpeg).cli_with_context(|| format!("Writing {}", path.display()))?;
        log::debug!("Wrote preview {}", path.display());
        saved.push(path);
    }
    Ok(saved)
}
