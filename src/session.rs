//! Tracking sessions
//!
//! `TrackingProcessor` owns everything that persists between video frames for
//! one user: the cursor, the smoothing filter and the interaction detectors of
//! the active mode. Feed it frames in arrival order, one call per frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::HandsfreeConfig;
use crate::error::HandsfreeError;
use crate::types::{CursorState, GestureSet, Landmark, Point2D};
use crate::vision::cursor::CursorSmoother;
use crate::vision::gesture::GestureClassifier;
use crate::vision::interaction::{EyeInteraction, HandInteraction, PointerAction};
use crate::vision::tracking::{ScreenMapping, TrackingMode};

/// One landmark snapshot from the upstream detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture time of the video frame
    pub timestamp: DateTime<Utc>,
    /// Normalized landmarks; empty when nothing was detected
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(timestamp: DateTime<Utc>, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp,
            landmarks,
        }
    }

    /// Parse and validate a frame from JSON
    pub fn from_json(json: &str) -> Result<Self, HandsfreeError> {
        let frame: Self = serde_json::from_str(json)?;
        frame.validate()?;
        Ok(frame)
    }

    /// Reject frames with non-finite coordinates
    pub fn validate(&self) -> Result<(), HandsfreeError> {
        match self
            .landmarks
            .iter()
            .position(|lm| !(lm.x.is_finite() && lm.y.is_finite()))
        {
            Some(i) => Err(HandsfreeError::InvalidFrame(format!(
                "landmark {} has a non-finite coordinate",
                i
            ))),
            None => Ok(()),
        }
    }
}

/// Result of processing one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub session_id: Uuid,
    /// Zero-based position of the frame within the session
    pub frame_index: u64,
    pub timestamp: DateTime<Utc>,
    /// Raw pointer target (normalized), if one was found
    pub target: Option<Point2D>,
    /// Smoothed cursor position (screen pixels)
    pub cursor: Point2D,
    /// Static gestures (hand mode only)
    pub gestures: GestureSet,
    pub actions: Vec<PointerAction>,
}

impl FrameReport {
    pub fn to_json(&self) -> Result<String, HandsfreeError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone)]
enum Detectors {
    Hand(HandInteraction),
    Eye(EyeInteraction),
}

impl Detectors {
    fn for_mode(mode: TrackingMode, config: &HandsfreeConfig, screen: ScreenMapping) -> Self {
        match mode {
            TrackingMode::Hand => Detectors::Hand(HandInteraction::new(config.hand.clone(), screen)),
            TrackingMode::Eye => Detectors::Eye(EyeInteraction::new(config.eye.clone(), screen)),
        }
    }
}

/// Stateful per-session frame processor
#[derive(Debug, Clone)]
pub struct TrackingProcessor {
    session_id: Uuid,
    mode: TrackingMode,
    screen: ScreenMapping,
    smoother: CursorSmoother,
    cursor: CursorState,
    detectors: Detectors,
    frame_index: u64,
}

impl TrackingProcessor {
    /// Create a processor; the configuration is validated first
    pub fn new(mode: TrackingMode, config: &HandsfreeConfig) -> Result<Self, HandsfreeError> {
        config.validate()?;

        let screen = ScreenMapping::from(&config.screen);
        let session_id = Uuid::new_v4();
        debug!(%session_id, %mode, "tracking session started");

        Ok(Self {
            session_id,
            mode,
            screen,
            smoother: CursorSmoother::with_coefficient(config.cursor.smoothing),
            cursor: CursorState::new(screen.center()),
            detectors: Detectors::for_mode(mode, config, screen),
            frame_index: 0,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    /// Current smoothed cursor (screen pixels)
    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    /// Number of frames processed so far
    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    /// Process one frame.
    ///
    /// A frame without a usable target leaves the cursor where it was and
    /// emits no actions. Frames with non-finite coordinates are treated the
    /// same way, since one NaN would stick in the recursive cursor filter.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameReport {
        let frame_index = self.frame_index;
        self.frame_index += 1;

        if let Err(e) = frame.validate() {
            warn!(frame_index, error = %e, "skipping frame");
            return FrameReport {
                session_id: self.session_id,
                frame_index,
                timestamp: frame.timestamp,
                target: None,
                cursor: self.cursor.position,
                gestures: GestureSet::new(),
                actions: Vec::new(),
            };
        }

        let gestures = match self.mode {
            TrackingMode::Hand => GestureClassifier::classify(&frame.landmarks),
            TrackingMode::Eye => GestureSet::new(),
        };

        let target = self.mode.target(&frame.landmarks);
        let actions = match target {
            Some(target) => {
                let cursor = self
                    .smoother
                    .advance(&mut self.cursor, self.screen.to_screen(target));
                match &mut self.detectors {
                    Detectors::Hand(hand) => hand.update(&frame.landmarks, cursor, frame.timestamp),
                    Detectors::Eye(eye) => {
                        eye.update(&frame.landmarks, Some(cursor), Some(target), frame.timestamp)
                    }
                }
            }
            None => Vec::new(),
        };

        FrameReport {
            session_id: self.session_id,
            frame_index,
            timestamp: frame.timestamp,
            target,
            cursor: self.cursor.position,
            gestures,
            actions,
        }
    }

    /// Parse a JSON frame, process it, and return the JSON report
    pub fn process_json(&mut self, frame_json: &str) -> Result<String, HandsfreeError> {
        let frame = LandmarkFrame::from_json(frame_json)?;
        self.process_frame(&frame).to_json()
    }

    /// Re-centre the cursor and clear detector state; the session id is kept
    pub fn reset(&mut self) {
        self.cursor = CursorState::new(self.screen.center());
        match &mut self.detectors {
            Detectors::Hand(hand) => hand.reset(),
            Detectors::Eye(eye) => eye.reset(),
        }
        self.frame_index = 0;
        debug!(session_id = %self.session_id, "tracking session reset");
    }
}
