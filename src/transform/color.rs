//! 8-bit HSV conversion and contrast matching the rounding of common imaging libraries.
//!
//! Hue and saturation are scaled to `0..=255` and truncated, so converting to HSV and back is
//! lossy in the same places a typical RGB -> HSV -> RGB round trip is.

/// Convert one RGB pixel to 8-bit HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    if minc == maxc {
        return [0, 0, maxc];
    }

    let cr = f32::from(maxc - minc);
    let s = cr / f32::from(maxc);
    let rc = f32::from(maxc - r) / cr;
    let gc = f32::from(maxc - g) / cr;
    let bc = f32::from(maxc - b) / cr;
    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    let h = (h / 6.0 + 1.0) % 1.0;
    [clip8((h * 255.0) as i32), clip8((s * 255.0) as i32), maxc]
}

/// Convert one 8-bit HSV pixel back to RGB.
pub fn hsv_to_rgb(h: u8, s: u8, v: u8) -> [u8; 3] {
    if s == 0 {
        return [v, v, v];
    }

    let hf = f32::from(h) * 6.0 / 255.0;
    let i = hf.floor() as i32;
    let f = hf - i as f32;
    let fs = f32::from(s) / 255.0;
    let vf = f32::from(v);
    let p = clip8((vf * (1.0 - fs)).round() as i32);
    let q = clip8((vf * (1.0 - fs * f)).round() as i32);
    let t = clip8((vf * (1.0 - fs * (1.0 - f))).round() as i32);
    match i.rem_euclid(6) {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// 8-bit luma (ITU-R 601-2) with fixed-point rounding.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000) >> 16) as u8
}

/// Scale RGB channels of an RGBA8 buffer away from the rounded mean luma by `factor`.
///
/// Alpha is left untouched. Results are truncated toward zero and clamped to `0..=255`.
pub fn enhance_contrast(rgba: &mut [u8], factor: f32) {
    let pixels = rgba.len() / 4;
    if pixels == 0 {
        return;
    }

    let sum: u64 = rgba
        .chunks_exact(4)
        .map(|px| u64::from(luma(px[0], px[1], px[2])))
        .sum();
    let mean = (sum as f64 / pixels as f64 + 0.5) as i32;
    let degenerate = mean as f32;

    for px in rgba.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            let v = degenerate + factor * (f32::from(*c) - degenerate);
            *c = if v <= 0.0 {
                0
            } else if v >= 255.0 {
                255
            } else {
                v as u8
            };
        }
    }
}

fn clip8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/transform/color.rs"]
mod tests;
