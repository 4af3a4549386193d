use std::path::Path;
use std::process::Command;

use crate::foundation::error::{BotError, BotResult};

/// Sample rate all audio is decoded to before muxing.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Interleaved 32-bit float PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Interleaved samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.interleaved_f32.len() / usize::from(self.channels)
        }
    }

    /// Playback duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / f64::from(self.sample_rate)
        }
    }

    /// `true` when there is nothing to play.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Drop everything after `max_secs`.
    pub fn truncate_secs(&mut self, max_secs: f64) {
        let max_frames = (max_secs.max(0.0) * f64::from(self.sample_rate)).floor() as usize;
        if self.frames() > max_frames {
            self.interleaved_f32
                .truncate(max_frames * usize::from(self.channels));
        }
    }

    /// Append silence until the track lasts at least `secs`.
    pub fn pad_to_secs(&mut self, secs: f64) {
        let target_frames = (secs.max(0.0) * f64::from(self.sample_rate)).ceil() as usize;
        if self.frames() < target_frames {
            self.interleaved_f32
                .resize(target_frames * usize::from(self.channels), 0.0);
        }
    }
}

/// Decode at most `max_secs` of audio from `path` into stereo f32 PCM with `ffmpeg`.
///
/// The duration limit is applied by the decoder, so long inputs are never fully decoded. A
/// container without an audio stream yields empty PCM.
pub fn decode_audio_f32_stereo(
    path: &Path,
    sample_rate: u32,
    max_secs: f64,
) -> BotResult<AudioPcm> {
    if sample_rate == 0 {
        return Err(BotError::validation("audio sample_rate must be non-zero"));
    }
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-t",
            &format!("{:.6}", max_secs.max(0.0)),
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| BotError::unreadable_media(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        if msg.contains("Stream specifier")
            || msg.contains("matches no streams")
            || msg.contains("Output file #0 does not contain any stream")
            || msg.contains("does not contain any stream")
        {
            return Ok(AudioPcm {
                sample_rate,
                channels: 2,
                interleaved_f32: Vec::new(),
            });
        }
        return Err(BotError::unreadable_media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    let interleaved_f32 = f32le_bytes_to_samples(&out.stdout)?;
    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32,
    })
}

pub(crate) fn f32le_bytes_to_samples(bytes: &[u8]) -> BotResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(BotError::unreadable_media(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Write interleaved samples as raw little-endian f32 for use as an `ffmpeg` input.
pub fn write_pcm_f32le(pcm: &AudioPcm, out_path: &Path) -> BotResult<()> {
    let mut bytes = Vec::<u8>::with_capacity(pcm.interleaved_f32.len() * 4);
    for &sample in &pcm.interleaved_f32 {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        BotError::encode_failed(format!(
            "failed to write pcm file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/audio.rs"]
mod tests;
