// ============================================================================
// reelscope-cli/src/commands/mod.rs
// ============================================================================
//
// COMMAND IMPLEMENTATIONS: One module per subcommand family
//
// SUBMODULES:
// - analyze: full optimization report
// - stages: visual-only and audio-only metrics
// - thumbnails: ranked thumbnail suggestions, optionally saved to disk
//
// SHARED HELPERS (this file):
// - load_config: config file, flag and environment layering
// - prepare: input, tool and configuration checks before a command runs

pub mod analyze;
pub mod stages;
pub mod thumbnails;

pub use analyze::run_analyze;
pub use stages::{run_audio, run_visual};
pub use thumbnails::run_thumbnails;

use crate::cli::GlobalArgs;
use crate::error::{CliErrorContext, CliResult};
use reelscope_core::{AnalysisConfig, CoreError, check_required_tools};
use std::path::Path;

/// Builds the analysis config: file (or defaults), then environment, then
/// command-line flags.
pub fn load_config(global: &GlobalArgs) -> CliResult<AnalysisConfig> {
    let mut config = match &global.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .cli_with_context(|| format!("Loading config file {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(cascade) = &global.face_cascade {
        config.face_cascade = Some(cascade.clone());
    }
    if let Some(temp_dir) = &global.temp_dir {
        config.temp_dir = Some(temp_dir.clone());
    }

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Checks the input file, external tools and configuration before any work
/// starts.
pub fn prepare(global: &GlobalArgs, input: &Path) -> CliResult<AnalysisConfig> {
    if !input.is_file() {
        return Err(CoreError::VideoOpen(format!(
            "Input file not found: {}",
            input.display()
        )));
    }
    check_required_tools()?;
    load_config(global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"thumbnail_count": 3, "dark_threshold": 60.0}"#).unwrap();

        let global = GlobalArgs {
            config: Some(config_path),
            temp_dir: Some(PathBuf::from("/var/tmp/reelscope")),
            ..GlobalArgs::default()
        };
        let config = load_config(&global).unwrap();
        assert_eq!(config.thumbnail_count, 3);
        assert_eq!(config.dark_threshold, 60.0);
        assert_eq!(config.temp_dir, Some(PathBuf::from("/var/tmp/reelscope")));
    }

    #[test]
    fn test_invalid_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"thumbnail_count": 0}"#).unwrap();

        let global = GlobalArgs {
            config: Some(config_path),
            ..GlobalArgs::default()
        };
        let err = load_config(&global).unwrap_err();
        assert!(err.to_string().contains("thumbnail_count"));
    }

    #[test]
    fn test_missing_input_fails_first() {
        let err = prepare(&GlobalArgs::default(), Path::new("/nonexistent/reel.mp4")).unwrap_err();
        assert!(err.to_string().contains("Input file not found"));
    }
}
