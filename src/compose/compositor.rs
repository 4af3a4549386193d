use std::time::Instant;

use tracing::{debug, info};

use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{BotError, BotResult};
use crate::media::source::VisualSource;
use crate::transform::FramePipeline;

/// Longest artifact ever produced, in seconds.
pub const MAX_NOTE_DURATION_SECS: f64 = 60.0;

/// Facts about a finished artifact, as needed by the transport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteInfo {
    /// Playable duration in seconds.
    pub duration_secs: f64,
    /// Width and height of the square output.
    pub side: u32,
    /// Encoded frame count.
    pub frames: u64,
}

impl NoteInfo {
    /// Duration rounded down to whole seconds.
    pub fn whole_seconds(&self) -> u32 {
        self.duration_secs.max(0.0) as u32
    }
}

/// Drives a visual source through a transform pipeline into a sink at a fixed frame rate.
#[derive(Clone, Copy, Debug)]
pub struct Compositor {
    fps: Fps,
    max_duration_secs: f64,
}

impl Compositor {
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            max_duration_secs: MAX_NOTE_DURATION_SECS,
        }
    }

    /// Override the duration ceiling (never above [`MAX_NOTE_DURATION_SECS`]).
    pub fn with_max_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = secs.clamp(0.0, MAX_NOTE_DURATION_SECS);
        self
    }

    /// Number of output frames for `duration_secs` of content.
    pub fn frame_count(&self, duration_secs: f64) -> u64 {
        self.fps
            .secs_to_frames_floor(duration_secs.min(self.max_duration_secs))
            .max(1)
    }

    /// Render every frame of `source` and finish the sink.
    ///
    /// The source's duration is capped before the first frame is produced. Output frames must be
    /// square; a sink failure is reported as `EncodeFailed`.
    pub fn compose(
        &self,
        source: &mut dyn VisualSource,
        pipeline: &FramePipeline,
        audio: Option<AudioInputConfig>,
        sink: &mut dyn FrameSink,
    ) -> BotResult<NoteInfo> {
        let started = Instant::now();
        let duration = source.duration_secs().min(self.max_duration_secs);
        if duration <= 0.0 || source.width() == 0 || source.height() == 0 {
            return Err(BotError::empty_media("source has no frames to render"));
        }
        let total = self.frame_count(duration);
        debug!(
            frames = total,
            duration_secs = duration,
            stages = ?pipeline.stage_names(),
            "compose start"
        );

        let prepared = if source.is_static() {
            match source.frame_at(0.0)? {
                Some(frame) => Some(pipeline.prepare_static(frame)?),
                None => return Err(BotError::empty_media("static source yielded no frame")),
            }
        } else {
            None
        };

        let mut audio = audio;
        let mut side = None;
        let mut written = 0u64;
        for i in 0..total {
            let t = self.fps.frames_to_secs(i);
            let frame = match prepared.as_ref() {
                Some(prepared) => pipeline.apply_prepared(prepared, t)?,
                None => match source.frame_at(t)? {
                    Some(frame) => pipeline.apply(frame, t)?,
                    None => break,
                },
            };

            let frame_side = match side {
                Some(side) => side,
                None => {
                    if !frame.is_square() {
                        return Err(BotError::validation(format!(
                            "pipeline produced a {}x{} frame; output must be square",
                            frame.width, frame.height
                        )));
                    }
                    sink.begin(SinkConfig {
                        width: frame.width,
                        height: frame.height,
                        fps: self.fps,
                        audio: audio.take(),
                    })
                    .map_err(as_encode_failure)?;
                    side = Some(frame.width);
                    frame.width
                }
            };
            if frame.width != frame_side || frame.height != frame_side {
                return Err(BotError::validation("frame size changed mid-stream"));
            }

            sink.push_frame(FrameIndex(i), &frame)
                .map_err(as_encode_failure)?;
            written += 1;
        }

        let Some(side) = side else {
            return Err(BotError::empty_media("source yielded no frames"));
        };
        sink.end().map_err(as_encode_failure)?;

        let info = NoteInfo {
            duration_secs: self.fps.frames_to_secs(written),
            side,
            frames: written,
        };
        info!(
            frames = written,
            side,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "composed note"
        );
        Ok(info)
    }
}

fn as_encode_failure(err: BotError) -> BotError {
    match err {
        BotError::EncodeFailed(_) => err,
        other => BotError::encode_failed(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
