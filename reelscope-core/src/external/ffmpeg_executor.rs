// ============================================================================
// reelscope-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Frame Decoding and Audio Extraction
//
// Spawns ffmpeg through ffmpeg-sidecar. Frames are decoded to raw RGB24 on
// stdout and surfaced as an iterator; audio is written as mono 32-bit float
// PCM at the stream's native sample rate.
//
// KEY COMPONENTS:
// - FrameStream: owns one decode process, yields frames, kills it on drop
// - spawn_frame_decoder: builds the bounded decode command
// - extract_mono_pcm: runs audio extraction to completion

use crate::error::{CoreResult, command_failed_error, command_start_error};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel, OutputVideoFrame};
use ffmpeg_sidecar::iter::FfmpegIterator;
use std::path::Path;
use std::process::ExitStatus;

/// A running ffmpeg decode process and its event stream.
///
/// The process is killed and reaped when the stream is dropped, so an early
/// `break` out of a frame loop never leaves a decoder behind.
pub struct FrameStream {
    child: FfmpegChild,
    events: FfmpegIterator,
}

impl Iterator for FrameStream {
    type Item = OutputVideoFrame;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.events.next()? {
                FfmpegEvent::OutputFrame(frame) => return Some(frame),
                FfmpegEvent::Error(e) | FfmpegEvent::Log(LogLevel::Error, e) => {
                    log::debug!("ffmpeg decode error: {}", e);
                }
                _ => {}
            }
        }
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        // Already-exited processes report an error here; nothing to do.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Starts decoding `count` frames from `input_path` as RGB24.
///
/// `start_secs` seeks before decoding when it is positive.
pub fn spawn_frame_decoder(
    input_path: &Path,
    start_secs: f64,
    count: u64,
) -> CoreResult<FrameStream> {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner();

    if start_secs > 0.0 {
        cmd.args(["-ss", &format!("{start_secs:.6}")]);
    }
    cmd.input(input_path.to_string_lossy().into_owned());
    cmd.args(["-an", "-sn", "-frames:v", &count.to_string()]);
    cmd.rawvideo();

    log::trace!(
        "Decoding {} frames from {} at {:.3}s",
        count,
        input_path.display(),
        start_secs
    );

    let mut child = cmd
        .spawn()
        .map_err(|e| command_start_error("ffmpeg (frame decode)", e))?;

    let events = child.iter().map_err(|e| {
        log::error!("Failed to get ffmpeg event iterator: {}", e);
        command_failed_error(
            "ffmpeg (frame decode)",
            ExitStatus::default(),
            e.to_string(),
        )
    })?;

    Ok(FrameStream { child, events })
}

/// Writes the audio track of `input_path` to `output_path` as mono
/// little-endian f32 samples at the native sample rate.
pub fn extract_mono_pcm(input_path: &Path, output_path: &Path) -> CoreResult<()> {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner();
    cmd.input(input_path.to_string_lossy().into_owned());
    cmd.args(["-vn", "-sn", "-ac", "1", "-f", "f32le"]);
    cmd.overwrite();
    cmd.output(output_path.to_string_lossy().into_owned());

    log::debug!(
        "Extracting mono f32le audio from {} to {}",
        input_path.display(),
        output_path.display()
    );

    let mut child = cmd
        .spawn()
        .map_err(|e| command_start_error("ffmpeg (audio extraction)", e))?;

    let mut errors = Vec::new();
    let iterator = child.iter().map_err(|e| {
        command_failed_error(
            "ffmpeg (audio extraction)",
            ExitStatus::default(),
            e.to_string(),
        )
    })?;
    for event in iterator {
        match event {
            FfmpegEvent::Error(e) | FfmpegEvent::Log(LogLevel::Error, e) => errors.push(e),
            FfmpegEvent::Log(LogLevel::Fatal, e) => errors.push(e),
            _ => {}
        }
    }

    let status = child.wait()?;
    if !status.success() {
        log::error!("Audio extraction failed: {}", status);
        return Err(command_failed_error(
            "ffmpeg (audio extraction)",
            status,
            errors.join("\n"),
        ));
    }

    log::debug!("Audio extracted to: {}", output_path.display());
    Ok(())
}
