use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use tracing::{debug, warn};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRGBA};
use crate::foundation::error::{BotError, BotResult};
use crate::media::probe::is_ffmpeg_on_path;

/// Fixed codec settings for every artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeProfile {
    /// Output frame rate.
    pub fps: Fps,
    pub video_codec: String,
    pub video_bitrate_kbps: u32,
    pub audio_codec: String,
}

impl Default for EncodeProfile {
    fn default() -> Self {
        Self {
            fps: Fps::whole(24),
            video_codec: "libx264".to_string(),
            video_bitrate_kbps: 500,
            audio_codec: "aac".to_string(),
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// The container is written to `<out>.partial` and only renamed to the final path after ffmpeg
/// exits successfully; on any failure (or when dropped early) the partial file is removed.
pub struct FfmpegSink {
    out_path: PathBuf,
    partial_path: PathBuf,
    profile: EncodeProfile,
    bg_rgba: [u8; 4],

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    frames_written: u64,
}

impl FfmpegSink {
    /// Create a sink that will produce `out_path`.
    pub fn new(out_path: impl Into<PathBuf>, profile: EncodeProfile) -> Self {
        let out_path = out_path.into();
        let partial_path = partial_path_for(&out_path);
        Self {
            out_path,
            partial_path,
            profile,
            bg_rgba: [0, 0, 0, 255],
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            frames_written: 0,
        }
    }

    fn build_command(&self, cfg: &SinkConfig) -> BotResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
        ]);

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(BotError::validation(
                    "audio sample_rate and channels must be non-zero when audio is enabled",
                ));
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path)
            .args(["-map", "0:v:0", "-map", "1:a:0"]);
        }

        cmd.args([
            "-c:v",
            &self.profile.video_codec,
            "-b:v",
            &format!("{}k", self.profile.video_bitrate_kbps),
            "-pix_fmt",
            "yuv420p",
            "-r",
            &format!("{}/{}", self.profile.fps.num, self.profile.fps.den),
        ]);
        if cfg.audio.is_some() {
            cmd.args(["-c:a", &self.profile.audio_codec, "-shortest"]);
        } else {
            cmd.arg("-an");
        }
        cmd.args(["-movflags", "+faststart", "-f", "mp4"])
            .arg(&self.partial_path);
        Ok(cmd)
    }

    fn discard_partial(&self) {
        match std::fs::remove_file(&self.partial_path) {
            Ok(()) => debug!(path = %self.partial_path.display(), "removed partial output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.partial_path.display(), error = %e, "failed to remove partial output"),
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> BotResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(BotError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(BotError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(BotError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(BotError::encode_failed(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = self.build_command(&cfg)?.spawn().map_err(|e| {
            BotError::encode_failed(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BotError::encode_failed("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| BotError::encode_failed("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> BotResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| BotError::encode_failed("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(BotError::encode_failed(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(BotError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(BotError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(&mut self.scratch, &frame.data, self.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(BotError::encode_failed("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            BotError::encode_failed(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> BotResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| BotError::encode_failed("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            BotError::encode_failed(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| BotError::encode_failed("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| BotError::encode_failed(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            self.discard_partial();
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(BotError::encode_failed(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        if self.frames_written == 0 {
            self.discard_partial();
            return Err(BotError::encode_failed("no frames were encoded"));
        }

        std::fs::rename(&self.partial_path, &self.out_path).map_err(|e| {
            self.discard_partial();
            BotError::encode_failed(format!(
                "failed to move encoded output to '{}': {e}",
                self.out_path.display()
            ))
        })?;
        debug!(path = %self.out_path.display(), frames = self.frames_written, "encoded output");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            if let Some(handle) = self.stderr_drain.take() {
                let _ = handle.join();
            }
            self.discard_partial();
        }
    }
}

fn partial_path_for(out_path: &Path) -> PathBuf {
    let mut name = out_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    out_path.with_file_name(name)
}

/// Composite straight-alpha RGBA8 over `bg_rgba`, producing opaque pixels.
fn flatten_to_opaque_rgba8(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> BotResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(BotError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (mul_div255(s[0] as u16, a) + mul_div255(bg_r, inv)).min(255) as u8;
        d[1] = (mul_div255(s[1] as u16, a) + mul_div255(bg_g, inv)).min(255) as u8;
        d[2] = (mul_div255(s[2] as u16, a) + mul_div255(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> BotResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
