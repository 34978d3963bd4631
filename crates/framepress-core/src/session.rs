//! The edit session.
//!
//! One `EditSession` owns everything a single editing pass needs: the
//! source image, the selected frame filter, the gesture-driven transform
//! state, and the append-only overlay list. Commit snapshots that state and
//! runs the two compositors; at most one commit may be in flight at a time.

use crate::buffer::ImageBuffer;
use crate::compose::{composite_masked, flatten, ComposeError, MaskRegion, OverlayDescriptor};
use crate::geometry::{Point, Rect, Vector};
use crate::transform::{
    reduce, GestureEvent, GesturePhase, InteractionMode, ScaleLimits, TransformState,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for session commits.
#[derive(Debug, Error)]
pub enum CommitError {
    /// A commit is already running for this session. The caller must wait
    /// for its completion before requesting another.
    #[error("A commit is already in flight for this session")]
    CommitInFlight,

    /// Compositing failed; prior session state is untouched.
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// A frame filter as supplied by the external filter catalog.
///
/// The core treats this as opaque configuration: whether gestures are
/// allowed, the clip mask (if any), and an optional preferred foreground
/// size inside the editing viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameFilter {
    /// Display name, for host UI use only.
    pub name: String,
    /// Whether pan/pinch reposition the foreground. When false, gestures
    /// toggle the foreground/source preview instead.
    pub allow_gesture: bool,
    /// Clip region; `None` means no mask-based compositing on commit.
    pub mask: Option<MaskRegion>,
    /// Preferred foreground size in view space, when the filter dictates one.
    pub default_foreground_size: Option<(f32, f32)>,
}

impl FrameFilter {
    /// A pass-through filter: no mask, gestures allowed.
    pub fn none() -> Self {
        Self {
            name: "None".to_string(),
            allow_gesture: true,
            mask: None,
            default_foreground_size: None,
        }
    }
}

/// Session-wide policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Pinch scale clamp applied by the gesture reducer.
    pub scale_limits: ScaleLimits,
}

/// Aspect-fit a size into a bounding size.
///
/// Returns the largest size with `size`'s aspect ratio that fits inside
/// `max`. Zero-dimension inputs are returned unchanged.
pub fn fit_size(size: (f32, f32), max: (f32, f32)) -> (f32, f32) {
    let (w, h) = size;
    let (max_w, max_h) = max;
    if w == 0.0 || h == 0.0 {
        return size;
    }
    if w / max_w > h / max_h {
        (max_w, max_w * h / w)
    } else {
        (max_h * w / h, max_h)
    }
}

/// A single photo-editing pass.
///
/// Lifecycle: create with the source image and viewport, select filters and
/// push overlays as the user works, feed gestures through
/// [`EditSession::handle_gesture`], and call [`EditSession::commit`] when
/// the user taps done. The session stays usable after a failed commit.
#[derive(Debug, Clone)]
pub struct EditSession {
    source: ImageBuffer,
    viewport: Rect,
    config: SessionConfig,
    filter: FrameFilter,
    transform: TransformState,
    overlays: Vec<OverlayDescriptor>,
    next_overlay_order: u32,
    /// While a preview-toggle gesture is active the source image shows
    /// through instead of the filtered foreground.
    showing_source: bool,
    commit_in_flight: bool,
}

impl EditSession {
    /// Start a session for `source` displayed inside `viewport`.
    pub fn new(source: ImageBuffer, viewport: Rect, config: SessionConfig) -> Self {
        let center = viewport.center();
        Self {
            source,
            viewport,
            config,
            filter: FrameFilter::none(),
            transform: TransformState::reset(center),
            overlays: Vec::new(),
            next_overlay_order: 0,
            showing_source: false,
            commit_in_flight: false,
        }
    }

    /// The current transform state, for the host to render from.
    pub fn transform_state(&self) -> TransformState {
        self.transform
    }

    /// The active filter.
    pub fn filter(&self) -> &FrameFilter {
        &self.filter
    }

    /// Overlays in insertion order.
    pub fn overlays(&self) -> &[OverlayDescriptor] {
        &self.overlays
    }

    /// Whether the untouched source is currently showing (preview toggle).
    pub fn showing_source(&self) -> bool {
        self.showing_source
    }

    /// How gestures are interpreted for the active filter.
    pub fn interaction_mode(&self) -> InteractionMode {
        InteractionMode::for_filter(self.filter.allow_gesture)
    }

    /// Select a filter, replacing any previous mask wholesale.
    ///
    /// The transform resets to identity centered on the new mask (or the
    /// viewport center when the filter has no mask).
    pub fn select_filter(&mut self, filter: FrameFilter) {
        let center = filter
            .mask
            .as_ref()
            .map(|m| m.center())
            .unwrap_or_else(|| self.viewport.center());
        self.filter = filter;
        self.transform = TransformState::reset(center);
        self.showing_source = false;
    }

    /// Route one gesture event.
    ///
    /// In `FreeTransform` mode the event runs through the reducer. In
    /// `PreviewToggle` mode the transform is frozen and the gesture flips
    /// which of foreground/source is visible: the source shows while the
    /// gesture is active and the foreground returns on `Ended`.
    pub fn handle_gesture(&mut self, phase: GesturePhase, event: GestureEvent) {
        match self.interaction_mode() {
            InteractionMode::FreeTransform => {
                self.transform = reduce(self.transform, phase, event, self.config.scale_limits);
            }
            InteractionMode::PreviewToggle => {
                self.showing_source = phase != GesturePhase::Ended;
            }
        }
    }

    /// Append an overlay handed back by a picker screen.
    ///
    /// Returns the assigned insertion order. Overlays are append-only and
    /// never reordered.
    pub fn push_overlay(
        &mut self,
        layer: ImageBuffer,
        position: Point,
        rotation: f32,
        scale: f32,
    ) -> u32 {
        let order = self.next_overlay_order;
        self.next_overlay_order += 1;
        self.overlays.push(OverlayDescriptor {
            layer,
            position,
            rotation,
            scale,
            insertion_order: order,
        });
        order
    }

    /// Remove an overlay by its insertion order (explicit user delete).
    ///
    /// Returns true when an overlay was removed. Remaining orders are not
    /// reassigned, preserving the relative draw order.
    pub fn remove_overlay(&mut self, insertion_order: u32) -> bool {
        let before = self.overlays.len();
        self.overlays.retain(|o| o.insertion_order != insertion_order);
        self.overlays.len() != before
    }

    /// Convenience pan entry point.
    pub fn handle_pan(&mut self, phase: GesturePhase, delta: Vector) {
        self.handle_gesture(phase, GestureEvent::Pan { delta });
    }

    /// Convenience pinch entry point.
    pub fn handle_pinch(&mut self, phase: GesturePhase, ratio: f32) {
        self.handle_gesture(phase, GestureEvent::Pinch { ratio });
    }

    /// Foreground size in view space: the filter's preferred size, or the
    /// source aspect-fit into the viewport.
    pub fn foreground_size(&self) -> (f32, f32) {
        self.filter.default_foreground_size.unwrap_or_else(|| {
            fit_size(
                (self.source.width as f32, self.source.height as f32),
                (self.viewport.width, self.viewport.height),
            )
        })
    }

    /// Flatten the current edit into one output image.
    ///
    /// Takes an immutable snapshot of the transform, mask, and overlay list,
    /// then runs the mask-clipped compositor (skipped when no mask-based
    /// filter is active — the untransformed source feeds the overlay pass
    /// directly) followed by the overlay compositor.
    ///
    /// At most one commit may be in flight; a second request fails with
    /// [`CommitError::CommitInFlight`] until [`EditSession::finish_commit`]
    /// runs. On success the transform state is consumed (reset); on failure
    /// all prior state is left untouched.
    pub fn commit(&mut self) -> Result<ImageBuffer, CommitError> {
        if self.commit_in_flight {
            return Err(CommitError::CommitInFlight);
        }
        self.commit_in_flight = true;

        let result = self.run_commit();
        if result.is_err() {
            // Failed commits release the guard immediately so the session
            // can retry.
            self.commit_in_flight = false;
        }
        result
    }

    fn run_commit(&mut self) -> Result<ImageBuffer, CommitError> {
        let base = match (&self.filter.mask, self.filter.allow_gesture) {
            (Some(mask), true) => {
                let (fg_w, fg_h) = self.foreground_size();
                let transform = self.transform.view_transform(fg_w, fg_h);
                let base = composite_masked(&self.source, &transform, mask, false)?;
                // The transform is consumed by a successful composite.
                self.transform = TransformState::reset(mask.center());
                base
            }
            // No mask-based filter active: the source feeds the overlay
            // pass untransformed.
            _ => self.source.clone(),
        };

        Ok(flatten(base, &self.overlays))
    }

    /// Signal that the host has taken delivery of the committed image,
    /// allowing a new commit to start.
    pub fn finish_commit(&mut self) {
        self.commit_in_flight = false;
    }
}
