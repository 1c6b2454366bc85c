// ============================================================================
// reelscope-core/src/processing/audio.rs
// ============================================================================
//
// AUDIO METRICS: Loudness, Silence Gaps and Noise Estimate
//
// The audio track is extracted once as mono f32 PCM at its native sample
// rate, loaded into a `Waveform`, and measured in three independent passes:
//
// - Loudness: mean frame RMS (2048-sample frames, hop 512, zero-padded and
//   centered) converted to dB, with a fixed -100 dB floor for digital silence.
// - Silence gaps: 500 ms windows stepped by 1 ms whose RMS stays at or below
//   the silence threshold, merged into ranges.
// - Noise: mean spectral flatness of a 2048-point periodic-Hann STFT power
//   spectrum. Digital silence is perfectly flat (1.0) under this definition.
//
// Any failure while getting the waveform produces the `Unavailable` variant;
// callers never receive a partially filled report.
//
// KEY COMPONENTS:
// - Waveform: mono samples plus sample rate
// - AudioMetrics: Measured(AudioReport) | Unavailable(AudioUnavailable)
// - analyze_audio_file / compute_audio_metrics

use crate::config::AnalysisConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{extract_mono_pcm, probe_audio_sample_rate};
use crate::temp_files::{create_temp_file, temp_base_dir};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use serde::Serialize;
use std::path::Path;

/// Samples per analysis frame for RMS and the STFT.
pub const FRAME_LENGTH: usize = 2048;

/// Samples between successive analysis frames.
pub const HOP_LENGTH: usize = 512;

/// Loudness reported for an all-zero signal.
pub const SILENT_DB: f64 = -100.0;

/// Floor applied to power spectrum bins before taking logarithms.
const POWER_FLOOR: f64 = 1e-10;

/// Mono audio samples in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    #[must_use]
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.samples.len() as f64 / f64::from(self.sample_rate)
        }
    }

    /// Decodes little-endian f32 PCM bytes. A trailing partial sample is dropped.
    #[must_use]
    pub fn from_f32le_bytes(bytes: &[u8], sample_rate: u32) -> Self {
        let samples = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Self {
            samples,
            sample_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Loudness {
    pub average_db: f64,
    pub is_too_quiet: bool,
    pub is_too_loud: bool,
}

/// A silent interval in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SilenceGap {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoiseLevel {
    pub spectral_flatness: f64,
    pub has_noise: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioReport {
    pub duration: f64,
    pub sample_rate: u32,
    pub loudness: Loudness,
    pub silence_gaps: Vec<SilenceGap>,
    pub noise_level: NoiseLevel,
    pub has_audio: bool,
    /// Derived: average loudness below the silent-or-low threshold.
    pub is_silent_or_low: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioUnavailable {
    pub error: String,
    pub has_audio: bool,
}

/// Audio metrics, or the reason they could not be measured.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AudioMetrics {
    Measured(AudioReport),
    Unavailable(AudioUnavailable),
}

impl AudioMetrics {
    #[must_use]
    pub fn unavailable(error: impl Into<String>) -> Self {
        AudioMetrics::Unavailable(AudioUnavailable {
            error: error.into(),
            has_audio: false,
        })
    }

    #[must_use]
    pub fn has_audio(&self) -> bool {
        match self {
            AudioMetrics::Measured(report) => report.has_audio,
            AudioMetrics::Unavailable(_) => false,
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&AudioReport> {
        match self {
            AudioMetrics::Measured(report) => Some(report),
            AudioMetrics::Unavailable(_) => None,
        }
    }
}

/// Extracts and measures the audio track of a video file.
///
/// Never fails: missing tracks and extraction errors become `Unavailable`.
pub fn analyze_audio_file(video_path: &Path, config: &AnalysisConfig) -> AudioMetrics {
    match load_waveform(video_path, config) {
        Ok(waveform) => compute_audio_metrics(&waveform, config),
        Err(e) => {
            log::warn!("Audio analysis unavailable for {}: {}", video_path.display(), e);
            AudioMetrics::unavailable(e.to_string())
        }
    }
}

/// Extracts the audio track to a scratch file and loads it.
///
/// The scratch file is deleted when this function returns.
pub fn load_waveform(video_path: &Path, config: &AnalysisConfig) -> CoreResult<Waveform> {
    let sample_rate = probe_audio_sample_rate(video_path)?.ok_or_else(|| {
        CoreError::AudioExtraction(format!("{} has no audio track", video_path.display()))
    })?;

    let scratch_dir = temp_base_dir(config.temp_dir.as_deref());
    let scratch = create_temp_file(&scratch_dir, "reelscope_audio", "f32")?;
    extract_mono_pcm(video_path, scratch.path())?;

    let bytes = std::fs::read(scratch.path())?;
    let waveform = Waveform::from_f32le_bytes(&bytes, sample_rate);
    log::debug!(
        "Loaded {} samples at {} Hz ({:.2}s)",
        waveform.samples.len(),
        waveform.sample_rate,
        waveform.duration()
    );
    Ok(waveform)
}

/// Measures an in-memory waveform.
pub fn compute_audio_metrics(waveform: &Waveform, config: &AnalysisConfig) -> AudioMetrics {
    if waveform.sample_rate == 0 {
        return AudioMetrics::unavailable("audio track has an invalid sample rate of 0");
    }
    if waveform.samples.is_empty() {
        return AudioMetrics::unavailable("audio track contains no samples");
    }

    let average_db = rms_to_db(mean_frame_rms(&waveform.samples));
    let loudness = Loudness {
        average_db,
        is_too_quiet: average_db < config.too_quiet_db,
        is_too_loud: average_db > config.too_loud_db,
    };

    let mut silence_gaps = detect_silence(
        &waveform.samples,
        waveform.sample_rate,
        config.min_silence_ms,
        config.silence_threshold_db,
    );
    silence_gaps.truncate(config.max_silence_gaps);

    let spectral_flatness = mean_spectral_flatness(&waveform.samples);
    let noise_level = NoiseLevel {
        spectral_flatness,
        has_noise: spectral_flatness > config.noise_flatness_threshold,
    };

    log::info!(
        "Audio metrics: {:.1} dB, {} silence gaps, flatness {:.3}",
        average_db,
        silence_gaps.len(),
        spectral_flatness
    );

    AudioMetrics::Measured(AudioReport {
        duration: waveform.duration(),
        sample_rate: waveform.sample_rate,
        loudness,
        silence_gaps,
        noise_level,
        has_audio: true,
        is_silent_or_low: average_db < config.silent_or_low_db,
    })
}

/// Converts a linear RMS level to dB, with [`SILENT_DB`] for zero.
#[must_use]
pub fn rms_to_db(rms: f64) -> f64 {
    if rms > 0.0 && rms.is_finite() {
        20.0 * rms.log10()
    } else {
        SILENT_DB
    }
}

/// Number of centered analysis frames for a signal of `len` samples.
fn frame_count(len: usize) -> usize {
    1 + len / HOP_LENGTH
}

/// Mean of per-frame RMS over centered, zero-padded frames.
#[must_use]
pub fn mean_frame_rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    // Prefix sums of squares over the signal; padding contributes zero.
    let mut prefix = Vec::with_capacity(samples.len() + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0f64;
    for &s in samples {
        acc += f64::from(s) * f64::from(s);
        prefix.push(acc);
    }

    let half = FRAME_LENGTH / 2;
    let frames = frame_count(samples.len());
    let mut total = 0.0;
    for t in 0..frames {
        // Frame t covers padded[t*hop .. t*hop + FRAME_LENGTH], i.e. signal
        // indices [t*hop - half, t*hop + half).
        let center = t * HOP_LENGTH;
        let lo = center.saturating_sub(half).min(samples.len());
        let hi = (center + half).min(samples.len());
        let energy = (prefix[hi] - prefix[lo]).max(0.0);
        total += (energy / FRAME_LENGTH as f64).sqrt();
    }
    total / frames as f64
}

/// Silent ranges: windows of `min_silence_ms` whose RMS is at or below
/// `threshold_db`, scanned every millisecond and merged.
#[must_use]
pub fn detect_silence(
    samples: &[f32],
    sample_rate: u32,
    min_silence_ms: u32,
    threshold_db: f64,
) -> Vec<SilenceGap> {
    if sample_rate == 0 || min_silence_ms == 0 {
        return Vec::new();
    }
    let rate = u64::from(sample_rate);
    let total_ms = (samples.len() as f64 * 1000.0 / rate as f64).round() as u64;
    let min_len = u64::from(min_silence_ms);
    if total_ms < min_len {
        return Vec::new();
    }

    let mut prefix = Vec::with_capacity(samples.len() + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0f64;
    for &s in samples {
        acc += f64::from(s) * f64::from(s);
        prefix.push(acc);
    }

    let threshold = 10f64.powf(threshold_db / 20.0);
    let to_sample = |ms: u64| ((ms * rate / 1000) as usize).min(samples.len());
    let window_is_silent = |start_ms: u64| {
        let lo = to_sample(start_ms);
        let hi = to_sample(start_ms + min_len);
        if hi <= lo {
            return true;
        }
        let mean_sq = (prefix[hi] - prefix[lo]).max(0.0) / (hi - lo) as f64;
        mean_sq.sqrt() <= threshold
    };

    let last_start = total_ms - min_len;
    let silent_starts: Vec<u64> = (0..=last_start).filter(|&ms| window_is_silent(ms)).collect();

    let Some((&first, rest)) = silent_starts.split_first() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    let mut range_start = first;
    let mut prev = first;
    for &start in rest {
        let continuous = start == prev + 1;
        let has_gap = start > prev + min_len;
        if !continuous && has_gap {
            ranges.push((range_start, prev + min_len));
            range_start = start;
        }
        prev = start;
    }
    ranges.push((range_start, prev + min_len));

    ranges
        .into_iter()
        .map(|(start, end)| SilenceGap {
            start: start as f64 / 1000.0,
            end: end as f64 / 1000.0,
        })
        .collect()
}

/// Periodic Hann window of length `n`.
fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / n as f64).cos())
        .collect()
}

/// Mean spectral flatness over centered, zero-padded STFT frames.
///
/// Returns a value in [0, 1]; 0.0 for an empty signal.
#[must_use]
pub fn mean_spectral_flatness(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let window = hann_window(FRAME_LENGTH);
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(FRAME_LENGTH);
    let bins = FRAME_LENGTH / 2 + 1;
    let half = FRAME_LENGTH / 2;

    let frames = frame_count(samples.len());
    let mut buffer = vec![Complex::new(0.0, 0.0); FRAME_LENGTH];
    let mut total = 0.0;

    for t in 0..frames {
        let center = t * HOP_LENGTH;
        for (k, slot) in buffer.iter_mut().enumerate() {
            let value = (center + k)
                .checked_sub(half)
                .and_then(|idx| samples.get(idx))
                .map_or(0.0, |&s| f64::from(s));
            *slot = Complex::new(value * window[k], 0.0);
        }
        fft.process(&mut buffer);

        let mut log_sum = 0.0;
        let mut sum = 0.0;
        for c in &buffer[..bins] {
            let power = c.norm_sqr().max(POWER_FLOOR);
            log_sum += power.ln();
            sum += power;
        }
        let geometric = (log_sum / bins as f64).exp();
        let arithmetic = sum / bins as f64;
        total += (geometric / arithmetic).clamp(0.0, 1.0);
    }

    total / frames as f64
}
