//! Landmark-driven pointer control
//!
//! Turns hand and face landmarks into gesture labels, a smoothed cursor and
//! pointer actions.
//!
//! Pipeline: Landmarks → tracking target → CursorSmoother → interaction detectors

pub mod cursor;
pub mod gesture;
pub mod interaction;
pub mod tracking;

pub use cursor::{advance_cursor, CursorSmoother, DEFAULT_SMOOTHING};
pub use gesture::GestureClassifier;
pub use interaction::{
    BlinkDetector, ClickCooldown, DwellDetector, EdgeScroller, EyeInteraction, HandInteraction,
    PointerAction,
};
pub use tracking::{ScreenMapping, TrackingMode};
