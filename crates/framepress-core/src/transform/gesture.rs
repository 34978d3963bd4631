//! Pan/pinch gesture reduction.
//!
//! Gesture recognizers deliver a stream of (phase, delta) events where each
//! delta is incremental: the recognizer's baseline is reset after every tick,
//! so a pan carries the translation since the last event and a pinch carries
//! a ratio close to 1.0. Only `Began`/`Changed` mutate state; `Ended` exists
//! for the host to finalize UI feedback and is a no-op here.

use super::state::{ScaleLimits, TransformState};
use crate::geometry::Vector;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a continuous gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
}

/// An incremental gesture delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureEvent {
    /// Translation since the last event, in view space.
    Pan { delta: Vector },
    /// Scale ratio since the last event (close to 1.0 per tick).
    Pinch { ratio: f32 },
}

/// How gesture input is interpreted for the active filter.
///
/// Filters that disallow free-form positioning do not get transform
/// mutations at all; while a gesture is active the editor instead toggles
/// between showing the filtered foreground and the untouched source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    /// Pan/pinch reposition the foreground image.
    #[default]
    FreeTransform,
    /// Gestures flip foreground/source visibility; the transform is frozen.
    PreviewToggle,
}

impl InteractionMode {
    /// Interaction mode for a filter's gesture policy.
    pub fn for_filter(allow_gesture: bool) -> Self {
        if allow_gesture {
            InteractionMode::FreeTransform
        } else {
            InteractionMode::PreviewToggle
        }
    }
}

/// Reduce one gesture event into a new transform state.
///
/// Pure and total: every input produces a valid state. Pan translates the
/// anchor center (and the transform's translation component with it); pinch
/// scales the linear part about the anchor, saturating at the configured
/// scale limits. Malformed pinch ratios (non-finite or non-positive) are
/// treated as 1.0 rather than rejected.
pub fn reduce(
    state: TransformState,
    phase: GesturePhase,
    event: GestureEvent,
    limits: ScaleLimits,
) -> TransformState {
    match phase {
        GesturePhase::Began | GesturePhase::Changed => {}
        GesturePhase::Ended => return state,
    }

    match event {
        GestureEvent::Pan { delta } => apply_pan(state, delta),
        GestureEvent::Pinch { ratio } => apply_pinch(state, ratio, limits),
    }
}

fn apply_pan(state: TransformState, delta: Vector) -> TransformState {
    let mut next = state;
    next.anchor_center = state.anchor_center.offset(delta);
    next.transform.tx += delta.dx;
    next.transform.ty += delta.dy;
    next
}

fn apply_pinch(state: TransformState, ratio: f32, limits: ScaleLimits) -> TransformState {
    let ratio = if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    };

    let current = state.transform.scale_magnitude();
    let target = limits.clamp(current * ratio);
    if current <= 0.0 {
        return state;
    }
    // Effective ratio after saturation; 1.0 when already pinned at a bound.
    let effective = target / current;

    let mut next = state;
    // Scale the linear part only: the image grows about its anchor center,
    // which does not move during a pinch.
    next.transform.a *= effective;
    next.transform.b *= effective;
    next.transform.c *= effective;
    next.transform.d *= effective;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn start() -> TransformState {
        TransformState::reset(Point::new(100.0, 150.0))
    }

    #[test]
    fn test_pan_moves_anchor() {
        let state = reduce(
            start(),
            GesturePhase::Changed,
            GestureEvent::Pan {
                delta: Vector::new(10.0, -5.0),
            },
            ScaleLimits::default(),
        );
        assert_eq!(state.anchor_center, Point::new(110.0, 145.0));
        assert_eq!(state.transform.tx, 10.0);
        assert_eq!(state.transform.ty, -5.0);
    }

    #[test]
    fn test_pan_is_additive() {
        let limits = ScaleLimits::default();
        let d1 = Vector::new(3.0, 7.0);
        let d2 = Vector::new(-10.0, 2.5);

        let stepped = reduce(
            reduce(
                start(),
                GesturePhase::Changed,
                GestureEvent::Pan { delta: d1 },
                limits,
            ),
            GesturePhase::Changed,
            GestureEvent::Pan { delta: d2 },
            limits,
        );
        let combined = reduce(
            start(),
            GesturePhase::Changed,
            GestureEvent::Pan {
                delta: d1.plus(d2),
            },
            limits,
        );
        assert_eq!(stepped.anchor_center, combined.anchor_center);
    }

    #[test]
    fn test_pinch_scales() {
        let state = reduce(
            start(),
            GesturePhase::Changed,
            GestureEvent::Pinch { ratio: 1.5 },
            ScaleLimits::default(),
        );
        assert!((state.scale() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_pinch_saturates_at_max() {
        let limits = ScaleLimits { min: 0.2, max: 4.0 };
        let state = reduce(
            start(),
            GesturePhase::Changed,
            GestureEvent::Pinch { ratio: 10.0 },
            limits,
        );
        assert!((state.scale() - 4.0).abs() < 1e-5, "scale: {}", state.scale());
    }

    #[test]
    fn test_pinch_saturates_at_min() {
        let limits = ScaleLimits { min: 0.2, max: 4.0 };
        let state = reduce(
            start(),
            GesturePhase::Changed,
            GestureEvent::Pinch { ratio: 0.001 },
            limits,
        );
        assert!((state.scale() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_pinch_does_not_move_anchor() {
        let state = reduce(
            start(),
            GesturePhase::Changed,
            GestureEvent::Pinch { ratio: 2.0 },
            ScaleLimits::default(),
        );
        assert_eq!(state.anchor_center, start().anchor_center);
        assert_eq!(state.transform.tx, 0.0);
    }

    #[test]
    fn test_ended_is_noop() {
        let state = reduce(
            start(),
            GesturePhase::Ended,
            GestureEvent::Pan {
                delta: Vector::new(50.0, 50.0),
            },
            ScaleLimits::default(),
        );
        assert_eq!(state, start());
    }

    #[test]
    fn test_malformed_ratio_is_identity() {
        let limits = ScaleLimits::default();
        for ratio in [f32::NAN, f32::INFINITY, 0.0, -2.0] {
            let state = reduce(
                start(),
                GesturePhase::Changed,
                GestureEvent::Pinch { ratio },
                limits,
            );
            assert!((state.scale() - 1.0).abs() < 1e-5, "ratio {ratio} mutated state");
        }
    }

    #[test]
    fn test_interaction_mode_for_filter() {
        assert_eq!(
            InteractionMode::for_filter(true),
            InteractionMode::FreeTransform
        );
        assert_eq!(
            InteractionMode::for_filter(false),
            InteractionMode::PreviewToggle
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::geometry::Point;
    use proptest::prelude::*;

    fn ratio_strategy() -> impl Strategy<Value = f32> {
        prop_oneof![
            0.01f32..=100.0,
            Just(f32::NAN),
            Just(0.0),
            Just(-1.0),
        ]
    }

    proptest! {
        /// Property: no pinch sequence ever leaves the scale limits.
        #[test]
        fn prop_scale_stays_clamped(ratios in prop::collection::vec(ratio_strategy(), 1..40)) {
            let limits = ScaleLimits { min: 0.2, max: 4.0 };
            let mut state = TransformState::reset(Point::new(0.0, 0.0));
            for ratio in ratios {
                state = reduce(state, GesturePhase::Changed, GestureEvent::Pinch { ratio }, limits);
                let s = state.scale();
                prop_assert!(s >= limits.min - 1e-4 && s <= limits.max + 1e-4, "scale escaped: {}", s);
            }
        }

        /// Property: pan order does not matter for the anchor center.
        #[test]
        fn prop_pan_commutes(
            deltas in prop::collection::vec((-50.0f32..=50.0, -50.0f32..=50.0), 1..20),
        ) {
            let limits = ScaleLimits::default();
            let start = TransformState::reset(Point::new(10.0, 10.0));

            let mut stepped = start;
            let mut total = Vector::default();
            for (dx, dy) in &deltas {
                let d = Vector::new(*dx, *dy);
                stepped = reduce(stepped, GesturePhase::Changed, GestureEvent::Pan { delta: d }, limits);
                total = total.plus(d);
            }
            let combined = reduce(start, GesturePhase::Changed, GestureEvent::Pan { delta: total }, limits);

            prop_assert!((stepped.anchor_center.x - combined.anchor_center.x).abs() < 1e-2);
            prop_assert!((stepped.anchor_center.y - combined.anchor_center.y).abs() < 1e-2);
        }

        /// Property: reduction always yields a finite, valid state.
        #[test]
        fn prop_state_stays_finite(
            ratios in prop::collection::vec(ratio_strategy(), 1..20),
            (dx, dy) in (-1000.0f32..=1000.0, -1000.0f32..=1000.0),
        ) {
            let limits = ScaleLimits::default();
            let mut state = TransformState::reset(Point::new(0.0, 0.0));
            state = reduce(state, GesturePhase::Changed, GestureEvent::Pan { delta: Vector::new(dx, dy) }, limits);
            for ratio in ratios {
                state = reduce(state, GesturePhase::Changed, GestureEvent::Pinch { ratio }, limits);
            }
            prop_assert!(state.transform.a.is_finite());
            prop_assert!(state.transform.determinant().is_finite());
            prop_assert!(state.anchor_center.x.is_finite());
        }
    }
}
