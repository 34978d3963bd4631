//! Overlay flattening.
//!
//! Stickers and text blocks come back from the picker screens as renderable
//! layers with their own placement. Flattening draws them over the base
//! image in insertion order, so later additions always end up on top.

use super::{blend_over, sample_bilinear};
use crate::buffer::ImageBuffer;
use crate::geometry::{AffineTransform, Point};
use serde::{Deserialize, Serialize};

/// A sticker or text layer with its placement on the base image.
///
/// Each overlay carries its own affine placement, independent of the
/// session's gesture transform. `insertion_order` is assigned by the edit
/// session; overlays render in strictly increasing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayDescriptor {
    /// Rendered content (sticker image or rasterized text block).
    pub layer: ImageBuffer,
    /// Center position of the layer on the base image, in view space.
    pub position: Point,
    /// Rotation about the layer center, radians.
    pub rotation: f32,
    /// Uniform scale of the layer.
    pub scale: f32,
    /// Draw order; later additions draw on top.
    pub insertion_order: u32,
}

impl OverlayDescriptor {
    /// Placement mapping layer pixel coordinates into base coordinates.
    fn placement(&self) -> AffineTransform {
        AffineTransform::translation(
            -(self.layer.width as f32) / 2.0,
            -(self.layer.height as f32) / 2.0,
        )
        .then(&AffineTransform::uniform_scale(self.scale))
        .then(&AffineTransform::rotation(self.rotation))
        .then(&AffineTransform::translation(self.position.x, self.position.y))
    }
}

/// Render all overlays onto `base`, producing one merged buffer.
///
/// Overlays draw in strictly increasing `insertion_order` with source-over
/// blending. An empty overlay list returns `base` unchanged without
/// allocating a new surface. Overlays whose placement cannot be inverted
/// (zero scale) occupy no pixels and are skipped.
pub fn flatten(base: ImageBuffer, overlays: &[OverlayDescriptor]) -> ImageBuffer {
    if overlays.is_empty() || base.is_empty() {
        return base;
    }

    let mut ordered: Vec<&OverlayDescriptor> = overlays.iter().collect();
    ordered.sort_by_key(|o| o.insertion_order);

    let mut out = base;
    for overlay in ordered {
        draw_overlay(&mut out, overlay);
    }
    out
}

/// Blend one overlay into the canvas over its transformed bounding box.
fn draw_overlay(canvas: &mut ImageBuffer, overlay: &OverlayDescriptor) {
    if overlay.layer.is_empty() {
        return;
    }
    let placement = overlay.placement();
    let Some(inverse) = placement.inverse() else {
        // Zero-scale overlay covers no pixels.
        return;
    };

    // Transformed corners bound the region that needs blending.
    let lw = overlay.layer.width as f32;
    let lh = overlay.layer.height as f32;
    let corners = [
        placement.apply(Point::new(0.0, 0.0)),
        placement.apply(Point::new(lw, 0.0)),
        placement.apply(Point::new(0.0, lh)),
        placement.apply(Point::new(lw, lh)),
    ];
    let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
    let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

    let x0 = (min_x.floor().max(0.0)) as u32;
    let y0 = (min_y.floor().max(0.0)) as u32;
    let x1 = (max_x.ceil().min(canvas.width as f32)) as u32;
    let y1 = (max_y.ceil().min(canvas.height as f32)) as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            let local = inverse.apply(Point::new(x as f32 + 0.5, y as f32 + 0.5));
            let src = sample_bilinear(&overlay.layer, local.x - 0.5, local.y - 0.5);
            if src[3] == 0 {
                continue;
            }
            let idx = (y as usize * canvas.width as usize + x as usize) * 4;
            let dst = [
                canvas.pixels[idx],
                canvas.pixels[idx + 1],
                canvas.pixels[idx + 2],
                canvas.pixels[idx + 3],
            ];
            let blended = blend_over(dst, src);
            canvas.pixels[idx..idx + 4].copy_from_slice(&blended);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> ImageBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        ImageBuffer::new(width, height, pixels)
    }

    fn overlay_at(layer: ImageBuffer, x: f32, y: f32, order: u32) -> OverlayDescriptor {
        OverlayDescriptor {
            layer,
            position: Point::new(x, y),
            rotation: 0.0,
            scale: 1.0,
            insertion_order: order,
        }
    }

    #[test]
    fn test_empty_overlays_identity() {
        let base = solid(10, 10, [5, 6, 7, 255]);
        let expected = base.clone();

        let out = flatten(base, &[]);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_single_overlay_drawn() {
        let base = solid(20, 20, [0, 0, 0, 255]);
        let sticker = solid(4, 4, [255, 0, 0, 255]);

        let out = flatten(base, &[overlay_at(sticker, 10.0, 10.0, 0)]);
        assert_eq!(out.pixel_at(10, 10), [255, 0, 0, 255]);
        assert_eq!(out.pixel_at(2, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn test_later_overlay_wins_overlap() {
        let base = solid(20, 20, [0, 0, 0, 255]);
        let a = overlay_at(solid(6, 6, [255, 0, 0, 255]), 10.0, 10.0, 0);
        let b = overlay_at(solid(6, 6, [0, 0, 255, 255]), 10.0, 10.0, 1);

        let out = flatten(base, &[a, b]);
        assert_eq!(out.pixel_at(10, 10), [0, 0, 255, 255]);
    }

    #[test]
    fn test_ordering_by_insertion_not_slice_position() {
        let base = solid(20, 20, [0, 0, 0, 255]);
        // Slice order reversed relative to insertion order.
        let b = overlay_at(solid(6, 6, [0, 0, 255, 255]), 10.0, 10.0, 1);
        let a = overlay_at(solid(6, 6, [255, 0, 0, 255]), 10.0, 10.0, 0);

        let out = flatten(base, &[b, a]);
        assert_eq!(out.pixel_at(10, 10), [0, 0, 255, 255]);
    }

    #[test]
    fn test_scaled_overlay_covers_more() {
        let base = solid(40, 40, [0, 0, 0, 255]);
        let mut sticker = overlay_at(solid(4, 4, [0, 255, 0, 255]), 20.0, 20.0, 0);
        sticker.scale = 4.0;

        let out = flatten(base, &[sticker]);
        // A 4x4 sticker at 4x scale spans 16 pixels around the center.
        assert_eq!(out.pixel_at(14, 14), [0, 255, 0, 255]);
        assert_eq!(out.pixel_at(25, 25), [0, 255, 0, 255]);
        assert_eq!(out.pixel_at(5, 5), [0, 0, 0, 255]);
    }

    #[test]
    fn test_rotated_overlay_stays_centered() {
        let base = solid(30, 30, [0, 0, 0, 255]);
        let mut sticker = overlay_at(solid(8, 8, [255, 255, 0, 255]), 15.0, 15.0, 0);
        sticker.rotation = std::f32::consts::FRAC_PI_4;

        let out = flatten(base, &[sticker]);
        // Center of the sticker is rotation-invariant.
        assert_eq!(out.pixel_at(15, 15), [255, 255, 0, 255]);
    }

    #[test]
    fn test_zero_scale_overlay_skipped() {
        let base = solid(10, 10, [1, 2, 3, 255]);
        let expected = base.clone();
        let mut sticker = overlay_at(solid(4, 4, [255, 0, 0, 255]), 5.0, 5.0, 0);
        sticker.scale = 0.0;

        let out = flatten(base, &[sticker]);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_overlay_off_canvas_clipped() {
        let base = solid(10, 10, [9, 9, 9, 255]);
        let sticker = overlay_at(solid(4, 4, [255, 0, 0, 255]), -20.0, -20.0, 0);

        let out = flatten(base, &[sticker]);
        // Entirely off-canvas: nothing changes.
        for chunk in out.pixels.chunks_exact(4) {
            assert_eq!(chunk, [9, 9, 9, 255]);
        }
    }

    #[test]
    fn test_transparent_overlay_preserves_base() {
        let base = solid(10, 10, [40, 50, 60, 255]);
        let sticker = overlay_at(solid(4, 4, [255, 0, 0, 0]), 5.0, 5.0, 0);

        let out = flatten(base, &[sticker]);
        assert_eq!(out.pixel_at(5, 5), [40, 50, 60, 255]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn overlay_strategy() -> impl Strategy<Value = OverlayDescriptor> {
        (
            2u32..=8,
            2u32..=8,
            0.0f32..=30.0,
            0.0f32..=30.0,
            -3.0f32..=3.0,
            0.25f32..=3.0,
            0u32..=10,
        )
            .prop_map(|(w, h, x, y, rot, scale, order)| OverlayDescriptor {
                layer: ImageBuffer::new(w, h, vec![200u8; (w * h * 4) as usize]),
                position: Point::new(x, y),
                rotation: rot,
                scale,
                insertion_order: order,
            })
    }

    proptest! {
        /// Property: flattening preserves base dimensions.
        #[test]
        fn prop_dimensions_preserved(overlays in prop::collection::vec(overlay_strategy(), 0..6)) {
            let base = ImageBuffer::new(30, 30, vec![128u8; 30 * 30 * 4]);
            let out = flatten(base.clone(), &overlays);
            prop_assert_eq!(out.width, base.width);
            prop_assert_eq!(out.height, base.height);
            prop_assert_eq!(out.pixels.len(), base.pixels.len());
        }

        /// Property: the empty overlay list is a pixel-exact identity.
        #[test]
        fn prop_empty_identity(seed in any::<u8>()) {
            let base = ImageBuffer::new(12, 12, vec![seed; 12 * 12 * 4]);
            let out = flatten(base.clone(), &[]);
            prop_assert_eq!(out, base);
        }

        /// Property: flattening is deterministic.
        #[test]
        fn prop_deterministic(overlays in prop::collection::vec(overlay_strategy(), 0..4)) {
            let base = ImageBuffer::new(20, 20, vec![64u8; 20 * 20 * 4]);
            let out1 = flatten(base.clone(), &overlays);
            let out2 = flatten(base, &overlays);
            prop_assert_eq!(out1, out2);
        }
    }
}
