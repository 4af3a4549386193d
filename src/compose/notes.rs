use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::compose::compositor::{Compositor, MAX_NOTE_DURATION_SECS, NoteInfo};
use crate::encode::ffmpeg::{EncodeProfile, FfmpegSink};
use crate::encode::sink::AudioInputConfig;
use crate::foundation::error::{BotError, BotResult};
use crate::media::audio::{AudioPcm, MIX_SAMPLE_RATE, decode_audio_f32_stereo, write_pcm_f32le};
use crate::media::probe::probe_video;
use crate::media::source::{StillImage, VideoStream};
use crate::transform::FramePipeline;
use crate::transform::crop::CenterCropSquare;
use crate::transform::overlay::OverlayBlend;
use crate::transform::resize::{ResizeSquare, VINYL_SIDE, video_note_side};
use crate::transform::rotate::Spin;

/// Produces finished video-note artifacts. Calls block until the file is complete.
pub trait NoteRenderer: Send + Sync {
    /// Square-crop, resize and re-encode `video` (with its audio) into `out`.
    fn render_video_note(&self, video: &Path, out: &Path) -> BotResult<NoteInfo>;

    /// Build a spinning record from `image` and `audio` into `out`.
    fn render_vinyl(&self, image: &Path, audio: &Path, out: &Path) -> BotResult<NoteInfo>;
}

/// [`NoteRenderer`] backed by the system `ffmpeg`/`ffprobe`.
#[derive(Clone, Debug, Default)]
pub struct FfmpegNoteRenderer {
    overlay_path: Option<PathBuf>,
    profile: EncodeProfile,
}

impl FfmpegNoteRenderer {
    pub fn new(overlay_path: Option<PathBuf>) -> Self {
        Self {
            overlay_path,
            profile: EncodeProfile::default(),
        }
    }

    pub fn with_profile(mut self, profile: EncodeProfile) -> Self {
        self.profile = profile;
        self
    }

    fn compositor(&self) -> Compositor {
        Compositor::new(self.profile.fps)
    }
}

impl NoteRenderer for FfmpegNoteRenderer {
    fn render_video_note(&self, video: &Path, out: &Path) -> BotResult<NoteInfo> {
        let info = probe_video(video)?;
        let duration = info.duration_sec.min(MAX_NOTE_DURATION_SECS);
        let side = video_note_side(info.square_side());
        debug!(
            path = %video.display(),
            width = info.width,
            height = info.height,
            source_fps = info.source_fps(),
            duration_secs = duration,
            side,
            "rendering video note"
        );

        // A short soundtrack must not cut the picture: `-shortest` follows the shorter stream.
        let pcm = if info.has_audio {
            let mut pcm = decode_audio_f32_stereo(video, MIX_SAMPLE_RATE, duration)?;
            pcm.pad_to_secs(duration);
            Some(pcm)
        } else {
            None
        };
        let pcm_file = PcmFile::write(out, pcm.as_ref())?;

        let mut source = VideoStream::open(info, self.profile.fps, duration)?;
        let pipeline = FramePipeline::new()
            .with_stage(CenterCropSquare)
            .with_stage(ResizeSquare::new(side)?);
        let mut sink = FfmpegSink::new(out, self.profile.clone());
        let note = self
            .compositor()
            .compose(&mut source, &pipeline, pcm_file.input(), &mut sink)?;
        info!(path = %out.display(), side = note.side, frames = note.frames, "video note ready");
        Ok(note)
    }

    fn render_vinyl(&self, image: &Path, audio: &Path, out: &Path) -> BotResult<NoteInfo> {
        let mut pcm = decode_audio_f32_stereo(audio, MIX_SAMPLE_RATE, MAX_NOTE_DURATION_SECS)?;
        pcm.truncate_secs(MAX_NOTE_DURATION_SECS);
        if pcm.is_empty() {
            return Err(BotError::empty_media("audio track has no samples"));
        }
        let duration = pcm.duration_secs();
        debug!(image = %image.display(), audio = %audio.display(), duration_secs = duration, "rendering vinyl");

        let mut source = StillImage::open(image, duration)?;
        let pipeline = FramePipeline::new()
            .with_stage(CenterCropSquare)
            .with_stage(ResizeSquare::new(VINYL_SIDE)?)
            .with_stage(OverlayBlend::load(self.overlay_path.as_deref(), VINYL_SIDE)?)
            .with_stage(Spin);
        let pcm_file = PcmFile::write(out, Some(&pcm))?;
        let mut sink = FfmpegSink::new(out, self.profile.clone());
        let note = self
            .compositor()
            .compose(&mut source, &pipeline, pcm_file.input(), &mut sink)?;
        info!(path = %out.display(), side = note.side, frames = note.frames, "vinyl ready");
        Ok(note)
    }
}

/// Raw PCM written next to the output for the encoder's second input; removed on drop.
struct PcmFile {
    path: Option<PathBuf>,
    sample_rate: u32,
    channels: u16,
}

impl PcmFile {
    fn write(out: &Path, pcm: Option<&AudioPcm>) -> BotResult<Self> {
        let Some(pcm) = pcm.filter(|p| !p.is_empty()) else {
            return Ok(Self {
                path: None,
                sample_rate: 0,
                channels: 0,
            });
        };
        let mut name = out.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".f32le");
        let path = out.with_file_name(name);
        write_pcm_f32le(pcm, &path)?;
        Ok(Self {
            path: Some(path),
            sample_rate: pcm.sample_rate,
            channels: pcm.channels,
        })
    }

    fn input(&self) -> Option<AudioInputConfig> {
        self.path.as_ref().map(|path| AudioInputConfig {
            path: path.clone(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }
}

impl Drop for PcmFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/notes.rs"]
mod tests;
