use std::path::Path;

use image::imageops::FilterType;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{BotError, BotResult};
use crate::transform::FrameStage;
use crate::transform::color::{enhance_contrast, hsv_to_rgb, rgb_to_hsv};

/// Weight of the overlay texture on the brightness channel.
pub const OVERLAY_STRENGTH: f32 = 0.4;
/// Contrast boost applied after the texture is imprinted.
pub const OVERLAY_CONTRAST: f32 = 1.02;

/// Imprints the luminance of a static texture onto a frame's HSV value channel.
///
/// The texture is loaded and resized once per generation run; hue and saturation of the frame
/// are kept. Without a texture the stage passes frames through untouched.
#[derive(Clone, Debug)]
pub struct OverlayBlend {
    side: u32,
    /// Per-pixel brightness offset derived from the texture.
    effect: Option<Vec<f32>>,
}

impl OverlayBlend {
    /// A stage that never changes its input.
    pub fn passthrough(side: u32) -> Self {
        Self { side, effect: None }
    }

    /// Load the texture at `path` (if any) for `side x side` frames.
    ///
    /// A missing file yields a pass-through stage; a file that exists but cannot be decoded is
    /// `UnreadableMedia`.
    pub fn load(path: Option<&Path>, side: u32) -> BotResult<Self> {
        let Some(path) = path else {
            return Ok(Self::passthrough(side));
        };
        if !path.is_file() {
            warn!(path = %path.display(), "overlay texture not found; blending disabled");
            return Ok(Self::passthrough(side));
        }

        let texture = image::ImageReader::open(path)
            .map_err(|e| BotError::unreadable_media(format!("failed to open overlay: {e}")))?
            .with_guessed_format()
            .map_err(|e| BotError::unreadable_media(format!("failed to sniff overlay: {e}")))?
            .decode()
            .map_err(|e| {
                BotError::unreadable_media(format!(
                    "failed to decode overlay '{}': {e}",
                    path.display()
                ))
            })?
            .to_rgb8();
        let texture = image::imageops::resize(&texture, side, side, FilterType::Lanczos3);
        debug!(path = %path.display(), side, "loaded overlay texture");
        Ok(Self::from_rgb(side, texture.as_raw()))
    }

    /// Build from a `side x side` RGB8 texture already at frame size.
    pub fn from_rgb(side: u32, rgb: &[u8]) -> Self {
        let effect = rgb
            .chunks_exact(3)
            .map(|px| {
                let gray = (f32::from(px[0]) + f32::from(px[1]) + f32::from(px[2])) / 3.0;
                (gray - 128.0) * OVERLAY_STRENGTH * 0.5
            })
            .collect();
        Self {
            side,
            effect: Some(effect),
        }
    }

    pub fn has_texture(&self) -> bool {
        self.effect.is_some()
    }
}

impl FrameStage for OverlayBlend {
    fn name(&self) -> &'static str {
        "overlay_blend"
    }

    fn apply(&self, mut frame: FrameRGBA, _t: f64) -> BotResult<FrameRGBA> {
        let Some(effect) = self.effect.as_ref() else {
            return Ok(frame);
        };
        if frame.width != self.side || frame.height != self.side {
            return Err(BotError::validation(format!(
                "overlay expects {side}x{side} frames, got {}x{}",
                frame.width,
                frame.height,
                side = self.side
            )));
        }

        frame
            .data
            .par_chunks_exact_mut(4)
            .zip(effect.par_iter())
            .for_each(|(px, &e)| {
                let [h, s, v] = rgb_to_hsv(px[0], px[1], px[2]);
                let v = (f32::from(v) + e).clamp(0.0, 255.0) as u8;
                let [r, g, b] = hsv_to_rgb(h, s, v);
                px[0] = r;
                px[1] = g;
                px[2] = b;
            });
        enhance_contrast(&mut frame.data, OVERLAY_CONTRAST);
        Ok(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/overlay.rs"]
mod tests;
