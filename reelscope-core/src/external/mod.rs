// ============================================================================
// reelscope-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates every call to an external command-line tool.
// Metadata comes from ffprobe (through the ffprobe crate); frame decoding and
// audio extraction run ffmpeg through ffmpeg-sidecar. Nothing outside this
// module spawns a process.
//
// KEY COMPONENTS:
// - check_dependency / check_required_tools: availability checks
// - ffprobe_executor: video and audio stream metadata
// - ffmpeg_executor: raw RGB frame streams and mono PCM extraction

use crate::error::{CoreError, CoreResult, command_start_error};

use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Spawning ffmpeg for frame decoding and audio extraction
pub mod ffmpeg_executor;

/// Stream metadata through ffprobe
pub mod ffprobe_executor;

pub use ffmpeg_executor::{FrameStream, extract_mono_pcm, spawn_frame_decoder};
pub use ffprobe_executor::{probe_audio_sample_rate, probe_video};

/// Tools every analysis needs.
pub const REQUIRED_TOOLS: [&str; 2] = ["ffmpeg", "ffprobe"];

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs the command with `-version` and only looks at whether it could be
/// started. Returns `DependencyNotFound` when the binary is not on the PATH.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(command_start_error(cmd_name, e))
        }
    }
}

/// Checks every tool in [`REQUIRED_TOOLS`], stopping at the first failure.
pub fn check_required_tools() -> CoreResult<()> {
    REQUIRED_TOOLS.iter().try_for_each(|tool| check_dependency(tool))
}
