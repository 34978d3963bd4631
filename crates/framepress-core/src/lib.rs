//! Framepress Core - Interactive transform-and-composite engine
//!
//! This crate provides the editing engine for Framepress: gesture-driven
//! placement of a foreground photo inside a frame mask, sticker/text overlay
//! layers, and flattening everything into one output image on commit.
//!
//! # Pipeline
//!
//! Gesture events run through a pure reducer into [`TransformState`]. On
//! commit the mask-clipped compositor rasterizes the transformed foreground
//! into the mask region, and the overlay compositor draws the overlay layers
//! on top. [`EditSession`] owns the state and sequences the two stages.
//!
//! All image buffers are immutable values: operations return new buffers and
//! never mutate their inputs.

pub mod buffer;
pub mod compose;
pub mod geometry;
pub mod session;
pub mod transform;

pub use buffer::ImageBuffer;
pub use compose::{composite_masked, flatten, ComposeError, MaskRegion, OverlayDescriptor};
pub use geometry::{AffineTransform, Point, Rect, Vector};
pub use session::{fit_size, CommitError, EditSession, FrameFilter, SessionConfig};
pub use transform::{
    reduce, GestureEvent, GesturePhase, InteractionMode, ScaleLimits, TransformState,
};
