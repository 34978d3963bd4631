//! Gesture-driven transform state.
//!
//! The foreground image's placement is a translation + uniform scale,
//! mutated incrementally by pan and pinch gestures. The reducer is a pure
//! function of (state, event) so the host UI can observe state changes and
//! re-render, with no hidden coupling between gesture callbacks and render
//! timing.

mod gesture;
mod state;

pub use gesture::{reduce, GestureEvent, GesturePhase, InteractionMode};
pub use state::{ScaleLimits, TransformState};
