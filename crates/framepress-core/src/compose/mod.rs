//! Flattening compositors.
//!
//! Two stages produce the final output image: the mask-clipped compositor
//! rasterizes the gesture-transformed foreground into a frame mask, and the
//! overlay compositor draws sticker/text layers on top. Both resample with
//! bilinear filtering and treat anything outside the source extent as
//! transparent.

mod mask;
mod overlay;

pub use mask::{composite_masked, MaskRegion};
pub use overlay::{flatten, OverlayDescriptor};

use crate::buffer::ImageBuffer;
use thiserror::Error;

/// Largest output canvas a single composite may allocate, in pixels.
///
/// 64 megapixels of RGBA is a 256 MB allocation; anything past that is a
/// runaway transform rather than a plausible edit.
pub const MAX_CANVAS_PIXELS: u64 = 64_000_000;

/// Error types for compositing operations.
///
/// Degenerate (zero-size) sources are not an error: the compositors hand
/// them back unchanged.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The commit transform has no inverse. Unreachable while the pinch
    /// scale clamp holds, but checked rather than assumed.
    #[error("Transform is singular (determinant {determinant})")]
    SingularTransform { determinant: f32 },

    /// The output canvas would exceed the allocation budget.
    #[error("Output canvas {width}x{height} exceeds the allocation budget")]
    AllocationFailed { width: u32, height: u32 },
}

/// Sample a buffer at fractional coordinates with bilinear filtering.
///
/// The four nearest texels are weighted by distance; taps outside the
/// buffer contribute transparent black, so edges fade out instead of
/// clamping or erroring.
pub(crate) fn sample_bilinear(buffer: &ImageBuffer, x: f32, y: f32) -> [u8; 4] {
    if !x.is_finite() || !y.is_finite() {
        return [0, 0, 0, 0];
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let p00 = buffer.pixel_at(x0, y0);
    let p10 = buffer.pixel_at(x0 + 1, y0);
    let p01 = buffer.pixel_at(x0, y0 + 1);
    let p11 = buffer.pixel_at(x0 + 1, y0 + 1);

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] as f32 * (1.0 - fx) * (1.0 - fy)
            + p10[i] as f32 * fx * (1.0 - fy)
            + p01[i] as f32 * (1.0 - fx) * fy
            + p11[i] as f32 * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}

/// Source-over blend of straight-alpha RGBA pixels.
pub(crate) fn blend_over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    if sa >= 1.0 {
        return src;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = src[i] as f32 / 255.0;
        let dc = dst[i] as f32 / 255.0;
        let c = (sc * sa + dc * da * (1.0 - sa)) / out_a;
        out[i] = (c * 255.0).clamp(0.0, 255.0).round() as u8;
    }
    out[3] = (out_a * 255.0).clamp(0.0, 255.0).round() as u8;
    out
}
