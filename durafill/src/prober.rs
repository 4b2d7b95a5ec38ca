//! Audio duration probing
//!
//! Uses symphonia for format-agnostic container probing (MP3, FLAC, AAC, WAV,
//! OGG, ...). The declared frame count of the default track is used when the
//! container provides one; otherwise the packet stream is walked to find the
//! end timestamp. No samples are decoded.

use crate::error::TaskError;
use std::path::Path;
use symphonia::core::codecs::{CodecParameters, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Measures playback length of a local audio file
///
/// Implementations block; the worker pool calls them from the blocking
/// thread pool.
pub trait Prober: Send + Sync {
    /// Duration in seconds (>= 0)
    fn probe(&self, path: &Path) -> Result<f64, TaskError>;
}

/// Prober backed by symphonia
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaProber;

impl Prober for SymphoniaProber {
    fn probe(&self, path: &Path) -> Result<f64, TaskError> {
        probe_duration(path)
    }
}

/// Probe an audio file and return its duration in seconds
///
/// # Errors
/// * `TaskError::Io` - file cannot be opened
/// * `TaskError::Decode` - unsupported format, no audio track, corrupt stream,
///   or no timing information
pub fn probe_duration(file_path: &Path) -> Result<f64, TaskError> {
    tracing::debug!(path = %file_path.display(), "Probing audio file");

    let file = std::fs::File::open(file_path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = file_path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| TaskError::Decode(format!("Failed to probe audio: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| TaskError::Decode("No audio track found".to_string()))?;

    let track_id = track.id;
    let params = track.codec_params.clone();

    if let Some(seconds) = params.n_frames.and_then(|frames| ts_to_seconds(frames, &params)) {
        tracing::debug!(
            path = %file_path.display(),
            duration_seconds = format!("{:.3}", seconds),
            "Duration from container header"
        );
        return Ok(seconds);
    }

    // No frame count in the header (e.g. MP3 without a Xing/Info frame)
    let mut end_ts = 0u64;
    let mut packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                return Err(TaskError::Decode(format!("Error reading packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        end_ts = end_ts.max(packet.ts().saturating_add(packet.dur()));
        packets += 1;
    }

    if packets == 0 {
        return Err(TaskError::Decode("No audio packets found".to_string()));
    }

    let seconds = ts_to_seconds(end_ts, &params)
        .ok_or_else(|| TaskError::Decode("Track has no time base or sample rate".to_string()))?;

    tracing::debug!(
        path = %file_path.display(),
        packets,
        duration_seconds = format!("{:.3}", seconds),
        "Duration from packet scan"
    );

    Ok(seconds)
}

/// Convert a timestamp in track units to seconds
fn ts_to_seconds(ts: u64, params: &CodecParameters) -> Option<f64> {
    if let Some(time_base) = params.time_base {
        let time = time_base.calc_time(ts);
        Some(time.seconds as f64 + time.frac)
    } else {
        params
            .sample_rate
            .filter(|rate| *rate > 0)
            .map(|rate| ts as f64 / rate as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_wav(path: &Path, seconds: f64, sample_rate: u32, channels: u16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (seconds * sample_rate as f64) as usize;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let sample = (0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() * i16::MAX as f32) as i16;
            for _ in 0..channels {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_probe_wav_duration() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("tone.wav");
        write_wav(&path, 1.5, 8000, 2);

        let seconds = SymphoniaProber.probe(&path).unwrap();
        assert!((seconds - 1.5).abs() < 0.01, "got {}", seconds);
    }

    #[test]
    fn test_probe_missing_file_is_io_error() {
        let result = probe_duration(Path::new("/nonexistent/file.mp3"));
        assert!(matches!(result, Err(TaskError::Io(_))));
    }

    #[test]
    fn test_probe_garbage_is_decode_error() {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(b"this is definitely not a wave file").unwrap();
        file.flush().unwrap();

        let result = probe_duration(file.path());
        assert!(matches!(result, Err(TaskError::Decode(_))), "got {:?}", result);
    }
}
