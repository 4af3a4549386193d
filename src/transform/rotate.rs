use rayon::prelude::*;

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::BotResult;
use crate::transform::FrameStage;

/// Angular velocity of the spinning record, in degrees per second.
pub const DEGREES_PER_SECOND: f64 = 12.0;

/// Clockwise rotation in degrees at `t` seconds, in `[0, 360)`.
pub fn rotation_angle_deg(t: f64) -> f64 {
    (t * DEGREES_PER_SECOND).rem_euclid(360.0)
}

/// Rotate clockwise about the frame center with nearest-neighbour sampling.
///
/// The output keeps the input dimensions; exposed corners are opaque black.
pub fn rotate_nearest(frame: &FrameRGBA, angle_deg: f64) -> FrameRGBA {
    let angle = angle_deg.rem_euclid(360.0);
    if angle == 0.0 || frame.width == 0 || frame.height == 0 {
        return frame.clone();
    }

    let rad = angle.to_radians();
    let cos = round15(rad.cos());
    let sin = round15(rad.sin());
    let (w, h) = (frame.width as usize, frame.height as usize);
    let cx = w as f64 / 2.0;
    let cy = h as f64 / 2.0;

    let mut out = vec![0u8; w * h * 4];
    out.par_chunks_exact_mut(w * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let dy = y as f64 + 0.5 - cy;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let dx = x as f64 + 0.5 - cx;
                let sx = cos * dx + sin * dy + cx;
                let sy = -sin * dx + cos * dy + cy;
                if sx < 0.0 || sy < 0.0 || sx >= w as f64 || sy >= h as f64 {
                    px.copy_from_slice(&[0, 0, 0, 255]);
                    continue;
                }
                let off = ((sy as usize) * w + sx as usize) * 4;
                px.copy_from_slice(&frame.data[off..off + 4]);
            }
        });

    FrameRGBA {
        width: frame.width,
        height: frame.height,
        data: out,
    }
}

fn round15(v: f64) -> f64 {
    (v * 1e15).round() / 1e15
}

/// Constant-velocity spin: the frame at `t` is rotated by [`rotation_angle_deg`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Spin;

impl FrameStage for Spin {
    fn name(&self) -> &'static str {
        "spin"
    }

    fn apply(&self, frame: FrameRGBA, t: f64) -> BotResult<FrameRGBA> {
        Ok(rotate_nearest(&frame, rotation_angle_deg(t)))
    }

    fn is_time_invariant(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/rotate.rs"]
mod tests;
