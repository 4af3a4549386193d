use image::imageops::FilterType;

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{BotError, BotResult};
use crate::transform::FrameStage;

/// Output side of a vinyl video.
pub const VINYL_SIDE: u32 = 512;

/// Output side for a video note cut from a square of `size` pixels.
pub fn video_note_side(size: u32) -> u32 {
    if size > 512 { 512 } else { 240 }
}

/// Lanczos3 resample of a square frame to `side x side`.
#[derive(Clone, Copy, Debug)]
pub struct ResizeSquare {
    side: u32,
}

impl ResizeSquare {
    pub fn new(side: u32) -> BotResult<Self> {
        if side == 0 {
            return Err(BotError::validation("resize side must be non-zero"));
        }
        Ok(Self { side })
    }

    pub fn side(&self) -> u32 {
        self.side
    }
}

impl FrameStage for ResizeSquare {
    fn name(&self) -> &'static str {
        "resize_square"
    }

    fn apply(&self, frame: FrameRGBA, _t: f64) -> BotResult<FrameRGBA> {
        if frame.width == self.side && frame.height == self.side {
            return Ok(frame);
        }
        let img = frame.into_image()?;
        let resized = image::imageops::resize(&img, self.side, self.side, FilterType::Lanczos3);
        Ok(FrameRGBA::from_image(resized))
    }
}
