//! Transform state for the foreground image.

use crate::geometry::{AffineTransform, Point};
use serde::{Deserialize, Serialize};

/// Bounds for the pinch scale factor.
///
/// Unclamped pinch input risks numerical blow-up or a near-zero transform
/// feeding the compositor's invertibility requirement, so the reducer
/// saturates at these bounds instead of rejecting input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleLimits {
    /// Smallest allowed uniform scale.
    pub min: f32,
    /// Largest allowed uniform scale.
    pub max: f32,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self { min: 0.2, max: 4.0 }
    }
}

impl ScaleLimits {
    /// Clamp a scale factor into the allowed range.
    #[inline]
    pub fn clamp(&self, scale: f32) -> f32 {
        scale.clamp(self.min, self.max)
    }
}

/// The foreground image's current placement in view space.
///
/// Invariant: `anchor_center` is always the transform's translation
/// component expressed in view space, and the uniform scale stays inside
/// the session's [`ScaleLimits`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// Translation + uniform scale applied to the foreground image.
    pub transform: AffineTransform,
    /// Where the image center sits in view space.
    pub anchor_center: Point,
}

impl TransformState {
    /// Identity transform anchored at the given center.
    ///
    /// Used when a filter is first selected and whenever a commit consumes
    /// the current state; `center` is normally the mask's geometric center.
    pub fn reset(center: Point) -> Self {
        Self {
            transform: AffineTransform::identity(),
            anchor_center: center,
        }
    }

    /// The current uniform scale factor.
    pub fn scale(&self) -> f32 {
        self.transform.scale_magnitude()
    }

    /// The full view-space placement for a foreground image of the given
    /// size.
    ///
    /// Maps image pixel coordinates (origin top-left) into view space: the
    /// image is centered on `anchor_center` and scaled by the pinched
    /// linear part. This is the transform the mask-clipped compositor
    /// inverts at commit time.
    pub fn view_transform(&self, image_width: f32, image_height: f32) -> AffineTransform {
        let linear = AffineTransform {
            tx: 0.0,
            ty: 0.0,
            ..self.transform
        };
        AffineTransform::translation(-image_width / 2.0, -image_height / 2.0)
            .then(&linear)
            .then(&AffineTransform::translation(
                self.anchor_center.x,
                self.anchor_center.y,
            ))
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::reset(Point::default())
    }
}
