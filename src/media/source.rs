use std::io::Read as _;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::debug;

use crate::foundation::core::{Fps, FrameRGBA};
use crate::foundation::error::{BotError, BotResult};
use crate::media::probe::VideoInfo;

/// A time-indexed source of frames feeding the transform pipeline.
///
/// Sources are read in non-decreasing time order, which lets video be streamed from a single
/// decoder process instead of seeking per frame.
pub trait VisualSource {
    /// Frame width in pixels.
    fn width(&self) -> u32;
    /// Frame height in pixels.
    fn height(&self) -> u32;
    /// Playable duration in seconds (already capped by the caller's ceiling, if any).
    fn duration_secs(&self) -> f64;
    /// `true` when every timestamp yields the same pixels.
    fn is_static(&self) -> bool {
        false
    }
    /// Pixels at `t` seconds, or `None` once the source has run out of frames.
    fn frame_at(&mut self, t: f64) -> BotResult<Option<FrameRGBA>>;
}

/// A video decoded by a long-lived `ffmpeg` process that emits RGBA frames at a fixed rate.
///
/// Only the first `limit_secs` seconds are decoded; the ceiling is applied before any frame
/// reaches the pipeline.
pub struct VideoStream {
    info: VideoInfo,
    fps: Fps,
    duration_secs: f64,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    next_index: u64,
    current: Option<FrameRGBA>,
    exhausted: bool,
}

impl VideoStream {
    /// Spawn the decoder for `info.source_path`.
    pub fn open(info: VideoInfo, fps: Fps, limit_secs: f64) -> BotResult<Self> {
        let duration_secs = info.duration_sec.min(limit_secs);
        if duration_secs <= 0.0 {
            return Err(BotError::empty_media("video has no playable duration"));
        }

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(&info.source_path)
            .args([
                "-t",
                &format!("{duration_secs:.6}"),
                "-an",
                "-vf",
                &format!("fps={}/{}", fps.num, fps.den),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                BotError::unreadable_media(format!(
                    "failed to spawn ffmpeg for video decode (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BotError::unreadable_media("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| BotError::unreadable_media("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            info,
            fps,
            duration_secs,
            child: Some(child),
            stdout: Some(stdout),
            stderr_drain: Some(stderr_drain),
            next_index: 0,
            current: None,
            exhausted: false,
        })
    }

    /// Probe facts of the underlying container.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn frame_len(&self) -> usize {
        self.info.width as usize * self.info.height as usize * 4
    }

    fn read_next(&mut self) -> BotResult<bool> {
        let len = self.frame_len();
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(false);
        };
        let mut buf = vec![0u8; len];
        match stdout.read_exact(&mut buf) {
            Ok(()) => {
                self.current = Some(FrameRGBA::new(self.info.width, self.info.height, buf)?);
                self.next_index += 1;
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.finish_decoder()?;
                Ok(false)
            }
            Err(e) => Err(BotError::unreadable_media(format!(
                "failed to read decoded frame from ffmpeg: {e}"
            ))),
        }
    }

    fn finish_decoder(&mut self) -> BotResult<()> {
        self.exhausted = true;
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait().map_err(|e| {
            BotError::unreadable_media(format!("failed to wait for ffmpeg decoder: {e}"))
        })?;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| BotError::unreadable_media("ffmpeg stderr drain thread panicked"))?
                .unwrap_or_default(),
            None => Vec::new(),
        };
        debug!(
            path = %self.info.source_path.display(),
            frames = self.next_index,
            "video decoder finished"
        );
        if !status.success() && self.next_index == 0 {
            return Err(BotError::unreadable_media(format!(
                "ffmpeg video decode failed for '{}': {}",
                self.info.source_path.display(),
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }
}

impl VisualSource for VideoStream {
    fn width(&self) -> u32 {
        self.info.width
    }

    fn height(&self) -> u32 {
        self.info.height
    }

    fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    fn frame_at(&mut self, t: f64) -> BotResult<Option<FrameRGBA>> {
        let target = self.fps.secs_to_frames_floor(t + 1e-9);
        if self.current.is_some() && target + 1 < self.next_index {
            return Err(BotError::validation(
                "video stream frames must be requested in time order",
            ));
        }
        while self.next_index <= target {
            if self.exhausted || !self.read_next()? {
                return Ok(None);
            }
        }
        Ok(self.current.clone())
    }
}

impl Drop for VideoStream {
    fn drop(&mut self) {
        drop(self.stdout.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

/// A still image decoded once and served for every timestamp.
#[derive(Clone, Debug)]
pub struct StillImage {
    frame: FrameRGBA,
    duration_secs: f64,
}

impl StillImage {
    /// Decode `path`, sniffing the format from its content.
    ///
    /// Alpha is discarded (pixels become opaque with their stored color).
    pub fn open(path: &Path, duration_secs: f64) -> BotResult<Self> {
        let img = image::ImageReader::open(path)
            .map_err(|e| {
                BotError::unreadable_media(format!("failed to open image '{}': {e}", path.display()))
            })?
            .with_guessed_format()
            .map_err(|e| BotError::unreadable_media(format!("failed to sniff image format: {e}")))?
            .decode()
            .map_err(|e| {
                BotError::unreadable_media(format!(
                    "failed to decode image '{}': {e}",
                    path.display()
                ))
            })?;
        let mut rgba = img.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(BotError::empty_media("image has zero dimensions"));
        }
        for px in rgba.pixels_mut() {
            px.0[3] = 255;
        }
        Ok(Self::from_frame(FrameRGBA::from_image(rgba), duration_secs))
    }

    /// Wrap an already decoded frame.
    pub fn from_frame(frame: FrameRGBA, duration_secs: f64) -> Self {
        Self {
            frame,
            duration_secs,
        }
    }

    /// Read only the image header and return its dimensions.
    pub fn probe_dimensions(path: &Path) -> BotResult<(u32, u32)> {
        let dims = image::ImageReader::open(path)
            .map_err(|e| BotError::unreadable_media(format!("failed to open image: {e}")))?
            .with_guessed_format()
            .map_err(|e| BotError::unreadable_media(format!("failed to sniff image format: {e}")))?
            .into_dimensions()
            .map_err(|e| BotError::unreadable_media(format!("unsupported image: {e}")))?;
        if dims.0 == 0 || dims.1 == 0 {
            return Err(BotError::empty_media("image has zero dimensions"));
        }
        Ok(dims)
    }

    /// The decoded pixels.
    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }
}

impl VisualSource for StillImage {
    fn width(&self) -> u32 {
        self.frame.width
    }

    fn height(&self) -> u32 {
        self.frame.height
    }

    fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    fn is_static(&self) -> bool {
        true
    }

    fn frame_at(&mut self, t: f64) -> BotResult<Option<FrameRGBA>> {
        if t < self.duration_secs {
            Ok(Some(self.frame.clone()))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
