// reelscope-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use reelscope_core::Platform;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Reelscope: short-form video optimization analyzer",
    long_about = "Measures picture and sound quality of a short-form video, ranks thumbnail \
                  frames per platform, and prints publishing suggestions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Print machine-readable JSON on stdout instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Optional: JSON file overriding analysis thresholds
    #[arg(long, global = true, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Optional: Face cascade model (OpenCV cascade XML or JSON). Face scoring is disabled without one.
    #[arg(long, global = true, value_name = "PATH", env = "REELSCOPE_FACE_CASCADE")]
    pub face_cascade: Option<PathBuf>,

    /// Optional: Directory for temporary audio files
    #[arg(long, global = true, value_name = "DIR", env = "REELSCOPE_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Optional: Write logs to a timestamped file in this directory
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs every analysis stage and prints the full optimization report
    Analyze(AnalyzeArgs),
    /// Prints visual metrics only
    Visual(VideoArgs),
    /// Prints audio metrics only
    Audio(VideoArgs),
    /// Ranks thumbnail frames for a platform
    Thumbnails(ThumbnailsArgs),
}

#[derive(Args, Debug)]
pub struct VideoArgs {
    /// Video file to analyze
    #[arg(required = true, value_name = "VIDEO")]
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Video file to analyze
    #[arg(required = true, value_name = "VIDEO")]
    pub input: PathBuf,

    /// Target platform: instagram, youtube_shorts or other
    #[arg(short, long, default_value = "other", value_parser = parse_platform)]
    pub platform: Platform,
}

#[derive(Args, Debug)]
pub struct ThumbnailsArgs {
    /// Video file to analyze
    #[arg(required = true, value_name = "VIDEO")]
    pub input: PathBuf,

    /// Target platform: instagram, youtube_shorts or other
    #[arg(short, long, default_value = "other", value_parser = parse_platform)]
    pub platform: Platform,

    /// Number of suggestions to return
    #[arg(short = 'n', long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..))]
    pub count: u16,

    /// Optional: Write the preview JPEGs to this directory
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,
}

/// Unknown platform names fall back to `other` instead of failing.
fn parse_platform(value: &str) -> Result<Platform, String> {
    Ok(Platform::parse_lossy(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_thumbnails_args() {
        let cli = Cli::try_parse_from([
            "reelscope",
            "thumbnails",
            "reel.mp4",
            "--platform",
            "youtube_shorts",
            "--count",
            "3",
            "--json",
        ])
        .unwrap();

        assert!(cli.global.json);
        match cli.command {
            Commands::Thumbnails(args) => {
                assert_eq!(args.platform, Platform::YoutubeShorts);
                assert_eq!(args.count, 3);
                assert_eq!(args.input, PathBuf::from("reel.mp4"));
                assert!(args.save_dir.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_platform_becomes_other() {
        let cli = Cli::try_parse_from(["reelscope", "analyze", "reel.mp4", "-p", "tiktok"]).unwrap();
        match cli.command {
            Commands::Analyze(args) => assert_eq!(args.platform, Platform::Other),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_zero_count_rejected() {
        let result = Cli::try_parse_from(["reelscope", "thumbnails", "reel.mp4", "--count", "0"]);
        assert!(result.is_err());
    }
}
