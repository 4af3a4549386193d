use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{BotError, BotResult};
use crate::transform::FrameStage;

/// Crop to the largest centered square.
///
/// The window starts at `floor((w - side) / 2)` on the long axis; pixels are copied, never
/// resampled.
#[derive(Clone, Copy, Debug, Default)]
pub struct CenterCropSquare;

impl CenterCropSquare {
    /// Offset and side of the crop window for a `w x h` frame.
    pub fn window(width: u32, height: u32) -> (u32, u32, u32) {
        let side = width.min(height);
        ((width - side) / 2, (height - side) / 2, side)
    }
}

impl FrameStage for CenterCropSquare {
    fn name(&self) -> &'static str {
        "center_crop_square"
    }

    fn apply(&self, frame: FrameRGBA, _t: f64) -> BotResult<FrameRGBA> {
        if frame.width == 0 || frame.height == 0 {
            return Err(BotError::empty_media("cannot crop a zero-sized frame"));
        }
        if frame.is_square() {
            return Ok(frame);
        }

        let (left, top, side) = Self::window(frame.width, frame.height);
        let src_stride = frame.width as usize * 4;
        let row_len = side as usize * 4;
        let mut data = Vec::with_capacity(row_len * side as usize);
        for y in top..top + side {
            let start = y as usize * src_stride + left as usize * 4;
            data.extend_from_slice(&frame.data[start..start + row_len]);
        }
        FrameRGBA::new(side, side, data)
    }
}
