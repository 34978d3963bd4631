//! Mask-clipped compositing.
//!
//! At commit time the foreground image is rasterized through the inverse of
//! its committed view transform into the mask's local space, cropped to the
//! mask bounds, and clipped by the mask shape's alpha channel.
//!
//! # Algorithm
//!
//! For each output pixel we map its mask-space position back into source
//! image coordinates through the inverted transform and sample bilinearly.
//! Inverse mapping means the output never has holes, and pixels whose
//! preimage falls outside the source are transparent rather than an error.

use super::{sample_bilinear, ComposeError, MAX_CANVAS_PIXELS};
use crate::buffer::ImageBuffer;
use crate::geometry::{AffineTransform, Point, Rect};
use serde::{Deserialize, Serialize};

/// The clip region supplied by a frame filter.
///
/// `shape`'s alpha channel defines where the foreground is visible;
/// `bounds` positions the shape in view space. Immutable once a frame is
/// selected and replaced wholesale when the user picks a different frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskRegion {
    /// Alpha-shaped clip image.
    pub shape: ImageBuffer,
    /// Placement of the shape in view space.
    pub bounds: Rect,
}

impl MaskRegion {
    pub fn new(shape: ImageBuffer, bounds: Rect) -> Self {
        Self { shape, bounds }
    }

    /// A rectangular (fully opaque) mask covering `bounds`.
    pub fn rectangular(bounds: Rect) -> Self {
        let w = bounds.width.round().max(1.0) as u32;
        let h = bounds.height.round().max(1.0) as u32;
        Self {
            shape: ImageBuffer::new(w, h, vec![255u8; (w as usize) * (h as usize) * 4]),
            bounds,
        }
    }

    /// Geometric center of the mask in view space.
    pub fn center(&self) -> Point {
        self.bounds.center()
    }
}

/// Rasterize `source` through the committed `transform`, clipped to `mask`.
///
/// `transform` maps source image coordinates into view space; it is
/// inverted here, so a singular transform fails with
/// [`ComposeError::SingularTransform`]. When `flipped` is set the source
/// raster is bottom-up and the single vertical-flip correction from
/// [`AffineTransform::flipped_vertically`] is composed onto the inverse.
///
/// Zero-size sources are returned unchanged (degenerate guard). Mask bounds
/// extending past the resampled extent yield transparent pixels, not an
/// error. `source` is never mutated.
pub fn composite_masked(
    source: &ImageBuffer,
    transform: &AffineTransform,
    mask: &MaskRegion,
    flipped: bool,
) -> Result<ImageBuffer, ComposeError> {
    if source.is_empty() {
        return Ok(source.clone());
    }

    let inverse = transform
        .inverse()
        .ok_or(ComposeError::SingularTransform {
            determinant: transform.determinant(),
        })?;
    // Reconcile a bottom-up source raster after mapping into source space.
    let inverse = if flipped {
        inverse.flipped_vertically(source.height as f32)
    } else {
        inverse
    };

    let out_w = mask.bounds.width.round().max(1.0) as u32;
    let out_h = mask.bounds.height.round().max(1.0) as u32;
    if (out_w as u64) * (out_h as u64) > MAX_CANVAS_PIXELS {
        return Err(ComposeError::AllocationFailed {
            width: out_w,
            height: out_h,
        });
    }

    let mut pixels = vec![0u8; (out_w as usize) * (out_h as usize) * 4];
    let shape_sx = mask.shape.width as f32 / out_w as f32;
    let shape_sy = mask.shape.height as f32 / out_h as f32;

    for oy in 0..out_h {
        for ox in 0..out_w {
            // Pixel center in view space, then back into source coordinates.
            let view = Point::new(
                mask.bounds.x + ox as f32 + 0.5,
                mask.bounds.y + oy as f32 + 0.5,
            );
            let src = inverse.apply(view);
            let mut rgba = sample_bilinear(source, src.x - 0.5, src.y - 0.5);

            // Clip by the shape's alpha, stretched over the bounds.
            let shape_x = (ox as f32 + 0.5) * shape_sx - 0.5;
            let shape_y = (oy as f32 + 0.5) * shape_sy - 0.5;
            let clip = sample_bilinear(&mask.shape, shape_x, shape_y)[3] as u32;
            rgba[3] = ((rgba[3] as u32 * clip) / 255) as u8;

            let idx = (oy as usize * out_w as usize + ox as usize) * 4;
            pixels[idx..idx + 4].copy_from_slice(&rgba);
        }
    }

    Ok(ImageBuffer::with_scale(
        out_w,
        out_h,
        source.pixel_scale,
        pixels,
    ))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
