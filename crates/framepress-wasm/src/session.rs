//! WASM bindings for the edit session.
//!
//! Exposes one [`JsEditSession`] per editing pass. The host UI feeds it
//! gesture events and overlay layers, observes the transform state to
//! re-render, and calls `commit` when the user taps done.

use crate::types::JsImageBuffer;
use framepress_core::{
    EditSession, FrameFilter, GesturePhase, MaskRegion, Point, Rect, ScaleLimits, SessionConfig,
    Vector,
};
use wasm_bindgen::prelude::*;

/// Gesture lifecycle phase, mirrored for JavaScript.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsGesturePhase {
    Began,
    Changed,
    Ended,
}

impl From<JsGesturePhase> for GesturePhase {
    fn from(phase: JsGesturePhase) -> Self {
        match phase {
            JsGesturePhase::Began => GesturePhase::Began,
            JsGesturePhase::Changed => GesturePhase::Changed,
            JsGesturePhase::Ended => GesturePhase::Ended,
        }
    }
}

/// A single editing pass over one source image.
#[wasm_bindgen]
pub struct JsEditSession {
    inner: EditSession,
}

#[wasm_bindgen]
impl JsEditSession {
    /// Start a session for `source` displayed in a viewport of the given
    /// size.
    ///
    /// # Arguments
    /// * `source` - The decoded source photo
    /// * `viewport_width` / `viewport_height` - Editing viewport in view space
    /// * `min_scale` / `max_scale` - Pinch scale clamp bounds
    #[wasm_bindgen(constructor)]
    pub fn new(
        source: &JsImageBuffer,
        viewport_width: f32,
        viewport_height: f32,
        min_scale: f32,
        max_scale: f32,
    ) -> JsEditSession {
        let config = SessionConfig {
            scale_limits: ScaleLimits {
                min: min_scale,
                max: max_scale,
            },
        };
        JsEditSession {
            inner: EditSession::new(
                source.to_buffer(),
                Rect::new(0.0, 0.0, viewport_width, viewport_height),
                config,
            ),
        }
    }

    /// Select a filter with no frame mask.
    pub fn select_filter(&mut self, name: String, allow_gesture: bool) {
        self.inner.select_filter(FrameFilter {
            name,
            allow_gesture,
            mask: None,
            default_foreground_size: None,
        });
    }

    /// Select a frame filter whose mask shape clips the foreground.
    ///
    /// The shape's alpha channel defines the clip; (x, y, width, height)
    /// position it in view space.
    #[allow(clippy::too_many_arguments)]
    pub fn select_frame_filter(
        &mut self,
        name: String,
        allow_gesture: bool,
        shape: &JsImageBuffer,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        self.inner.select_filter(FrameFilter {
            name,
            allow_gesture,
            mask: Some(MaskRegion::new(
                shape.to_buffer(),
                Rect::new(x, y, width, height),
            )),
            default_foreground_size: None,
        });
    }

    /// Feed one pan event (incremental translation in view space).
    pub fn handle_pan(&mut self, phase: JsGesturePhase, dx: f32, dy: f32) {
        self.inner.handle_pan(phase.into(), Vector::new(dx, dy));
    }

    /// Feed one pinch event (incremental scale ratio, ~1.0 per tick).
    pub fn handle_pinch(&mut self, phase: JsGesturePhase, ratio: f32) {
        self.inner.handle_pinch(phase.into(), ratio);
    }

    /// Whether the untouched source is showing (preview-toggle mode).
    #[wasm_bindgen(getter)]
    pub fn showing_source(&self) -> bool {
        self.inner.showing_source()
    }

    /// The current transform state as a plain JS object, for rendering.
    pub fn transform_state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.transform_state())
            .map_err(|e| js_sys::Error::new(&e.to_string()).into())
    }

    /// Append an overlay layer; returns its insertion order.
    pub fn push_overlay(
        &mut self,
        layer: &JsImageBuffer,
        x: f32,
        y: f32,
        rotation: f32,
        scale: f32,
    ) -> u32 {
        self.inner
            .push_overlay(layer.to_buffer(), Point::new(x, y), rotation, scale)
    }

    /// Remove an overlay by insertion order; returns true when removed.
    pub fn remove_overlay(&mut self, insertion_order: u32) -> bool {
        self.inner.remove_overlay(insertion_order)
    }

    /// Flatten the current edit into one output image.
    ///
    /// Fails if a previous commit has not been released with
    /// `finish_commit`, or if compositing fails; the session stays usable
    /// either way.
    pub fn commit(&mut self) -> Result<JsImageBuffer, JsValue> {
        match self.inner.commit() {
            Ok(buffer) => Ok(JsImageBuffer::from_buffer(buffer)),
            Err(e) => {
                web_sys::console::error_1(&JsValue::from_str(&e.to_string()));
                Err(js_sys::Error::new(&e.to_string()).into())
            }
        }
    }

    /// Release the commit guard after taking delivery of the result.
    pub fn finish_commit(&mut self) {
        self.inner.finish_commit();
    }
}

/// One-shot mask-clipped composite, without a session.
///
/// Rasterizes `source` through the affine transform (a, b, c, d, tx, ty),
/// clipped to the mask shape placed at (x, y, width, height). See the core
/// crate for the algorithm.
#[allow(clippy::too_many_arguments)]
#[wasm_bindgen]
pub fn composite_masked(
    source: &JsImageBuffer,
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    tx: f32,
    ty: f32,
    shape: &JsImageBuffer,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    flipped: bool,
) -> Result<JsImageBuffer, JsValue> {
    let transform = framepress_core::AffineTransform { a, b, c, d, tx, ty };
    let mask = MaskRegion::new(shape.to_buffer(), Rect::new(x, y, width, height));

    framepress_core::composite_masked(&source.to_buffer(), &transform, &mask, flipped)
        .map(JsImageBuffer::from_buffer)
        .map_err(|e| js_sys::Error::new(&e.to_string()).into())
}

/// Flatten a base image with a single overlay layer, without a session.
#[wasm_bindgen]
pub fn flatten_single(
    base: &JsImageBuffer,
    layer: &JsImageBuffer,
    x: f32,
    y: f32,
    rotation: f32,
    scale: f32,
) -> JsImageBuffer {
    let overlay = framepress_core::OverlayDescriptor {
        layer: layer.to_buffer(),
        position: Point::new(x, y),
        rotation,
        scale,
        insertion_order: 0,
    };
    JsImageBuffer::from_buffer(framepress_core::flatten(base.to_buffer(), &[overlay]))
}
