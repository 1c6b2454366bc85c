//! FFprobe integration for stream metadata.
//!
//! Provides the frame rate, frame count and dimensions of the first video
//! stream, and the native sample rate of the first audio stream.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::processing::sampler::VideoInfo;
use crate::utils::parse_frame_rate;
use ffprobe::{FfProbeError, Stream, ffprobe};
use std::path::Path;

/// Probes the first video stream of `input_path`.
///
/// The frame rate comes from `avg_frame_rate`, falling back to
/// `r_frame_rate`. The frame count comes from `nb_frames`, falling back to
/// duration times frame rate. An unknown rate is reported as 0.0.
pub fn probe_video(input_path: &Path) -> CoreResult<VideoInfo> {
    log::debug!(
        "Running ffprobe (via crate) for video info on: {}",
        input_path.display()
    );
    let metadata = ffprobe(input_path).map_err(|err| {
        log::error!("ffprobe failed for video info on {}: {:?}", input_path.display(), err);
        map_ffprobe_error(err, "video info")
    })?;

    let video_stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            CoreError::VideoInfoError(format!(
                "No video stream found in {}",
                input_path.display()
            ))
        })?;

    let width = video_stream.width.unwrap_or(0);
    let height = video_stream.height.unwrap_or(0);
    if width <= 0 || height <= 0 {
        return Err(CoreError::VideoInfoError(format!(
            "Invalid dimensions found in {}: width={}, height={}",
            input_path.display(),
            width,
            height
        )));
    }

    let mut fps = parse_frame_rate(&video_stream.avg_frame_rate);
    if fps <= 0.0 {
        fps = parse_frame_rate(&video_stream.r_frame_rate);
    }

    let duration = stream_duration(video_stream).or_else(|| {
        metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
    });

    let frame_count = video_stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.parse::<u64>().ok())
        .filter(|&n| n > 0)
        .or_else(|| {
            duration
                .filter(|d| d.is_finite() && *d > 0.0 && fps > 0.0)
                .map(|d| (d * fps).round() as u64)
        })
        .unwrap_or(0);

    log::debug!(
        "Video info for {}: {}x{}, {:.3} fps, {} frames",
        input_path.display(),
        width,
        height,
        fps,
        frame_count
    );

    Ok(VideoInfo {
        fps,
        frame_count,
        width: width as u32,
        height: height as u32,
    })
}

/// Native sample rate of the first audio stream, or `None` if the file has
/// no audio.
pub fn probe_audio_sample_rate(input_path: &Path) -> CoreResult<Option<u32>> {
    log::debug!(
        "Running ffprobe (via crate) for audio info on: {}",
        input_path.display()
    );
    let metadata = ffprobe(input_path).map_err(|err| map_ffprobe_error(err, "audio info"))?;

    let Some(audio_stream) = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
    else {
        log::debug!("No audio streams found by ffprobe for {}", input_path.display());
        return Ok(None);
    };

    let sample_rate = audio_stream
        .sample_rate
        .as_deref()
        .and_then(|r| r.parse::<u32>().ok())
        .filter(|&r| r > 0)
        .ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "Audio stream in {} has no usable sample rate",
                input_path.display()
            ))
        })?;

    Ok(Some(sample_rate))
}

fn stream_duration(stream: &Stream) -> Option<f64> {
    stream
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => CoreError::JsonParseError(format!(
            "ffprobe {context} output deserialization: {err}"
        )),
        _ => CoreError::FfprobeParse(format!(
            "Unknown ffprobe error during {context}: {err:?}"
        )),
    }
}
