//! Cursor smoothing
//!
//! A single-pole exponential moving average over raw pointer targets. The
//! filter is recursive: every call depends on the previous position, so calls
//! for one `CursorState` must happen once per frame, in arrival order.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{CursorState, Point2D};

/// Default fraction of the remaining distance covered per update
pub const DEFAULT_SMOOTHING: f64 = 0.25;

/// Exponential low-pass filter for cursor positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorSmoother {
    alpha: f64,
}

impl Default for CursorSmoother {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorSmoother {
    /// Create a smoother with the default coefficient (0.25)
    pub fn new() -> Self {
        Self {
            alpha: DEFAULT_SMOOTHING,
        }
    }

    /// Create a smoother with a specific coefficient.
    ///
    /// Callers are expected to validate the range; see `HandsfreeConfig::validate`.
    pub fn with_coefficient(alpha: f64) -> Self {
        Self { alpha }
    }

    pub fn coefficient(&self) -> f64 {
        self.alpha
    }

    /// Move `state` toward `target` and return the new position.
    ///
    /// The result is not clamped to any bounds.
    pub fn advance(&self, state: &mut CursorState, target: Point2D) -> Point2D {
        let p = &mut state.position;
        p.x += (target.x - p.x) * self.alpha;
        p.y += (target.y - p.y) * self.alpha;
        trace!(x = p.x, y = p.y, "cursor advanced");
        *p
    }
}

/// Advance a cursor with the default coefficient, taking and returning the state
pub fn advance_cursor(mut state: CursorState, target: Point2D) -> CursorState {
    CursorSmoother::new().advance(&mut state, target);
    state
}
