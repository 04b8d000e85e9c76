//! Pointer actions from tracked motion
//!
//! Stateful detectors that turn a stream of landmark snapshots and smoothed
//! cursor positions into discrete pointer actions:
//!
//! - Hand mode: pinch click (short = left, held = right), pinch + vertical
//!   movement scroll, and drag while index and middle fingers are raised.
//! - Eye mode: blink click and double click, dwell click, edge scroll.
//!
//! Detectors never read a clock. Every update takes the frame timestamp from
//! the caller, so replaying recorded frames gives the same actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::config::{EyeConfig, HandConfig, BLINK_HISTORY_LEN};
use crate::types::{Landmark, Point2D};
use crate::vision::gesture::{hand, landmark_distance};
use crate::vision::tracking::{eyelid_gap, ScreenMapping};

/// Vertical movement (pixels) below which a pinch does not scroll
const SCROLL_DEADBAND_PX: f64 = 2.0;

/// Discrete pointer action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PointerAction {
    LeftClick,
    RightClick,
    DoubleClick,
    DragStart,
    DragEnd,
    /// Positive scrolls up, negative scrolls down
    Scroll { amount: i32 },
}

fn seconds_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    (later - earlier).num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000_000.0
}

fn millis_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    (later - earlier).num_milliseconds()
}

/// Minimum spacing between clicks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickCooldown {
    period_secs: f64,
    last_click: Option<DateTime<Utc>>,
}

impl ClickCooldown {
    pub fn new(period_secs: f64) -> Self {
        Self {
            period_secs,
            last_click: None,
        }
    }

    /// Whether a click at `now` is allowed
    pub fn ready(&self, now: DateTime<Utc>) -> bool {
        match self.last_click {
            Some(last) => seconds_between(now, last) > self.period_secs,
            None => true,
        }
    }

    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.last_click = Some(now);
    }
}

// ============================================================================
// Hand mode
// ============================================================================

/// Pinch, scroll and drag detection for one tracked hand
#[derive(Debug, Clone)]
pub struct HandInteraction {
    config: HandConfig,
    screen: ScreenMapping,
    cooldown: ClickCooldown,
    pinch_started: Option<DateTime<Utc>>,
    last_scroll: Option<DateTime<Utc>>,
    scroll_anchor_y: Option<f64>,
    dragging: bool,
}

impl HandInteraction {
    pub fn new(config: HandConfig, screen: ScreenMapping) -> Self {
        let cooldown = ClickCooldown::new(config.click_cooldown_secs);
        Self {
            config,
            screen,
            cooldown,
            pinch_started: None,
            last_scroll: None,
            scroll_anchor_y: None,
            dragging: false,
        }
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch_started.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Process one hand snapshot.
    ///
    /// `cursor` is the smoothed cursor position in screen pixels for this frame.
    pub fn update(
        &mut self,
        landmarks: &[Landmark],
        cursor: Point2D,
        now: DateTime<Utc>,
    ) -> Vec<PointerAction> {
        let mut actions = Vec::new();

        if landmarks.len() <= hand::MIDDLE_TIP {
            return actions;
        }

        self.update_drag(landmarks, &mut actions);
        self.update_pinch(landmarks, cursor, now, &mut actions);
        self.update_scroll(cursor, now, &mut actions);

        if !actions.is_empty() {
            debug!(?actions, "hand actions");
        }
        actions
    }

    fn update_drag(&mut self, landmarks: &[Landmark], actions: &mut Vec<PointerAction>) {
        let wrist_y = landmarks[hand::WRIST].y;
        let raised = |tip: usize| wrist_y - landmarks[tip].y > self.config.finger_extension_threshold;
        let want_drag =
            self.config.spread_drag_enabled && raised(hand::INDEX_TIP) && raised(hand::MIDDLE_TIP);

        if want_drag && !self.dragging {
            self.dragging = true;
            actions.push(PointerAction::DragStart);
        } else if self.dragging && !want_drag {
            self.dragging = false;
            actions.push(PointerAction::DragEnd);
        }
    }

    fn update_pinch(
        &mut self,
        landmarks: &[Landmark],
        cursor: Point2D,
        now: DateTime<Utc>,
        actions: &mut Vec<PointerAction>,
    ) {
        let d = landmark_distance(landmarks, hand::THUMB_TIP, hand::INDEX_TIP);

        match self.pinch_started {
            None if d < self.config.pinch_close_threshold => {
                self.pinch_started = Some(now);
                self.scroll_anchor_y = Some(cursor.y);
            }
            Some(started) if d > self.config.pinch_release_threshold => {
                self.pinch_started = None;
                self.scroll_anchor_y = None;

                if !self.dragging && self.cooldown.ready(now) {
                    let held = seconds_between(now, started);
                    if held >= self.config.hold_right_click_secs {
                        actions.push(PointerAction::RightClick);
                    } else {
                        actions.push(PointerAction::LeftClick);
                    }
                    self.cooldown.mark(now);
                }
            }
            _ => {}
        }
    }

    fn update_scroll(&mut self, cursor: Point2D, now: DateTime<Utc>, actions: &mut Vec<PointerAction>) {
        if !self.config.scroll_enabled || !self.is_pinching() || self.dragging {
            return;
        }

        let Some(anchor_y) = self.scroll_anchor_y else {
            self.scroll_anchor_y = Some(cursor.y);
            return;
        };

        let due = match self.last_scroll {
            Some(last) => millis_between(now, last) >= self.config.scroll_sample_ms as i64,
            None => true,
        };
        if !due {
            return;
        }

        let dy = cursor.y - anchor_y;
        if dy.abs() > SCROLL_DEADBAND_PX {
            // Moving the hand down scrolls the page down
            let amount = (-(dy / self.screen.height) * self.config.scroll_gain) as i32;
            if amount != 0 {
                actions.push(PointerAction::Scroll { amount });
                self.last_scroll = Some(now);
            }
        }
        self.scroll_anchor_y = Some(cursor.y);
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone(), self.screen);
    }
}

// ============================================================================
// Eye mode
// ============================================================================

/// Blink click detection from the eyelid gap
#[derive(Debug, Clone)]
pub struct BlinkDetector {
    gap_threshold: f64,
    closed_frames: usize,
    double_window_secs: f64,
    history: VecDeque<f64>,
    last_blink: Option<DateTime<Utc>>,
}

impl BlinkDetector {
    pub fn new(config: &EyeConfig) -> Self {
        Self {
            gap_threshold: config.blink_gap_threshold,
            closed_frames: config.blink_consecutive_frames,
            double_window_secs: config.double_blink_window_secs,
            history: VecDeque::with_capacity(BLINK_HISTORY_LEN),
            last_blink: None,
        }
    }

    /// Whether enough recent samples show a closed eye
    pub fn is_blinking(&self) -> bool {
        self.history.iter().filter(|g| **g < self.gap_threshold).count() >= self.closed_frames
    }

    pub fn update(
        &mut self,
        gap: f64,
        now: DateTime<Utc>,
        cooldown: &mut ClickCooldown,
    ) -> Option<PointerAction> {
        self.history.push_back(gap);
        while self.history.len() > BLINK_HISTORY_LEN {
            self.history.pop_front();
        }

        if !self.is_blinking() || !cooldown.ready(now) {
            return None;
        }
        cooldown.mark(now);

        match self.last_blink {
            Some(last) if seconds_between(now, last) <= self.double_window_secs => {
                self.last_blink = None;
                Some(PointerAction::DoubleClick)
            }
            _ => {
                self.last_blink = Some(now);
                Some(PointerAction::LeftClick)
            }
        }
    }
}

/// Click when the cursor holds still
#[derive(Debug, Clone)]
pub struct DwellDetector {
    radius_px: f64,
    dwell_secs: f64,
    anchor: Option<(Point2D, DateTime<Utc>)>,
}

impl DwellDetector {
    pub fn new(config: &EyeConfig) -> Self {
        Self {
            radius_px: config.dwell_radius_px,
            dwell_secs: config.dwell_time_secs,
            anchor: None,
        }
    }

    pub fn update(
        &mut self,
        cursor: Point2D,
        now: DateTime<Utc>,
        cooldown: &mut ClickCooldown,
    ) -> Option<PointerAction> {
        let Some((anchor, started)) = self.anchor else {
            self.anchor = Some((cursor, now));
            return None;
        };

        if cursor.distance_to(&anchor) > self.radius_px {
            self.anchor = Some((cursor, now));
            return None;
        }

        if seconds_between(now, started) >= self.dwell_secs && cooldown.ready(now) {
            cooldown.mark(now);
            // Restart the timer so a long dwell clicks again later
            self.anchor = Some((anchor, now));
            return Some(PointerAction::LeftClick);
        }
        None
    }
}

/// Scroll while the gaze rests on the top or bottom edge
#[derive(Debug, Clone)]
pub struct EdgeScroller {
    margin: f64,
    speed: i32,
    every_ms: u64,
    last_scroll: Option<DateTime<Utc>>,
}

impl EdgeScroller {
    pub fn new(config: &EyeConfig) -> Self {
        Self {
            margin: config.edge_margin,
            speed: config.scroll_speed,
            every_ms: config.scroll_every_ms,
            last_scroll: None,
        }
    }

    /// `normalized_y` is the raw gaze height as a fraction of the screen
    pub fn update(&mut self, normalized_y: f64, now: DateTime<Utc>) -> Option<PointerAction> {
        if let Some(last) = self.last_scroll {
            if millis_between(now, last) < self.every_ms as i64 {
                return None;
            }
        }

        let amount = if normalized_y < self.margin {
            self.speed
        } else if normalized_y > 1.0 - self.margin {
            -self.speed
        } else {
            return None;
        };

        self.last_scroll = Some(now);
        Some(PointerAction::Scroll { amount })
    }
}

/// Blink, dwell and edge-scroll detection for one tracked face
#[derive(Debug, Clone)]
pub struct EyeInteraction {
    config: EyeConfig,
    screen: ScreenMapping,
    cooldown: ClickCooldown,
    blink: BlinkDetector,
    dwell: DwellDetector,
    edge: EdgeScroller,
}

impl EyeInteraction {
    pub fn new(config: EyeConfig, screen: ScreenMapping) -> Self {
        Self {
            cooldown: ClickCooldown::new(config.click_cooldown_secs),
            blink: BlinkDetector::new(&config),
            dwell: DwellDetector::new(&config),
            edge: EdgeScroller::new(&config),
            config,
            screen,
        }
    }

    /// Process one face snapshot.
    ///
    /// `cursor` is the smoothed cursor in screen pixels, `target` the raw gaze
    /// point in normalized units; both are `None` when no gaze was found.
    pub fn update(
        &mut self,
        landmarks: &[Landmark],
        cursor: Option<Point2D>,
        target: Option<Point2D>,
        now: DateTime<Utc>,
    ) -> Vec<PointerAction> {
        let mut actions = Vec::new();

        if let Some(gap) = eyelid_gap(landmarks) {
            actions.extend(self.blink.update(gap, now, &mut self.cooldown));
        }

        if self.config.dwell_enabled {
            if let Some(cursor) = cursor {
                actions.extend(self.dwell.update(cursor, now, &mut self.cooldown));
            }
        }

        if self.config.edge_scroll_enabled {
            if let Some(target) = target {
                actions.extend(self.edge.update(target.y, now));
            }
        }

        if !actions.is_empty() {
            debug!(?actions, "eye actions");
        }
        actions
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone(), self.screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::milliseconds(ms)
    }

    fn screen() -> ScreenMapping {
        ScreenMapping::new(1000.0, 1000.0)
    }

    /// Hand with fingers lowered; `pinch` sets the thumb-index distance
    fn hand_snapshot(pinch: f64) -> Vec<Landmark> {
        let mut lms = vec![Landmark::new(0.5, 0.8); hand::LANDMARK_COUNT];
        lms[hand::WRIST] = Landmark::new(0.5, 0.8);
        lms[hand::INDEX_TIP] = Landmark::new(0.5, 0.7);
        lms[hand::MIDDLE_TIP] = Landmark::new(0.55, 0.7);
        lms[hand::THUMB_TIP] = Landmark::new(0.5 + pinch, 0.7);
        lms
    }

    fn raised_hand() -> Vec<Landmark> {
        let mut lms = hand_snapshot(0.2);
        lms[hand::INDEX_TIP] = Landmark::new(0.5, 0.4);
        lms[hand::MIDDLE_TIP] = Landmark::new(0.55, 0.4);
        lms
    }

    fn hand_interaction() -> HandInteraction {
        HandInteraction::new(HandConfig::default(), screen())
    }

    #[test]
    fn test_short_pinch_left_clicks() {
        let mut hi = hand_interaction();
        let cursor = Point2D::new(500.0, 500.0);

        assert_eq!(hi.update(&hand_snapshot(0.01), cursor, t(0)), vec![]);
        assert!(hi.is_pinching());
        assert_eq!(
            hi.update(&hand_snapshot(0.1), cursor, t(200)),
            vec![PointerAction::LeftClick]
        );
        assert!(!hi.is_pinching());
    }

    #[test]
    fn test_held_pinch_right_clicks() {
        let mut hi = hand_interaction();
        let cursor = Point2D::new(500.0, 500.0);

        hi.update(&hand_snapshot(0.01), cursor, t(0));
        assert_eq!(
            hi.update(&hand_snapshot(0.1), cursor, t(1000)),
            vec![PointerAction::RightClick]
        );
    }

    #[test]
    fn test_pinch_hysteresis() {
        let mut hi = hand_interaction();
        let cursor = Point2D::new(500.0, 500.0);

        // Between close and release thresholds nothing changes
        hi.update(&hand_snapshot(0.045), cursor, t(0));
        assert!(!hi.is_pinching());

        hi.update(&hand_snapshot(0.03), cursor, t(10));
        assert!(hi.is_pinching());

        assert_eq!(hi.update(&hand_snapshot(0.05), cursor, t(20)), vec![]);
        assert!(hi.is_pinching());
    }

    #[test]
    fn test_click_cooldown() {
        let mut hi = hand_interaction();
        let cursor = Point2D::new(500.0, 500.0);

        hi.update(&hand_snapshot(0.01), cursor, t(0));
        assert_eq!(
            hi.update(&hand_snapshot(0.1), cursor, t(100)),
            vec![PointerAction::LeftClick]
        );
        hi.update(&hand_snapshot(0.01), cursor, t(150));
        assert_eq!(hi.update(&hand_snapshot(0.1), cursor, t(200)), vec![]);
    }

    #[test]
    fn test_pinch_vertical_motion_scrolls() {
        let mut hi = hand_interaction();

        hi.update(&hand_snapshot(0.01), Point2D::new(500.0, 500.0), t(0));
        // 100px down on a 1000px screen with gain 1200 → scroll -120
        assert_eq!(
            hi.update(&hand_snapshot(0.01), Point2D::new(500.0, 600.0), t(50)),
            vec![PointerAction::Scroll { amount: -120 }]
        );
        // Within the sample interval nothing is emitted
        assert_eq!(
            hi.update(&hand_snapshot(0.01), Point2D::new(500.0, 500.0), t(60)),
            vec![]
        );
        // Small jitter is ignored
        assert_eq!(
            hi.update(&hand_snapshot(0.01), Point2D::new(500.0, 601.0), t(200)),
            vec![]
        );
    }

    #[test]
    fn test_spread_drag() {
        let mut hi = hand_interaction();
        let cursor = Point2D::new(500.0, 500.0);

        assert_eq!(
            hi.update(&raised_hand(), cursor, t(0)),
            vec![PointerAction::DragStart]
        );
        assert!(hi.is_dragging());
        assert_eq!(hi.update(&raised_hand(), cursor, t(10)), vec![]);
        assert_eq!(
            hi.update(&hand_snapshot(0.2), cursor, t(20)),
            vec![PointerAction::DragEnd]
        );
    }

    #[test]
    fn test_pinch_release_while_dragging_does_not_click() {
        let mut hi = hand_interaction();
        let cursor = Point2D::new(500.0, 500.0);

        let mut pinched = raised_hand();
        pinched[hand::THUMB_TIP] = Landmark::new(0.51, 0.4);

        assert_eq!(
            hi.update(&pinched, cursor, t(0)),
            vec![PointerAction::DragStart]
        );
        assert!(hi.is_pinching());
        assert_eq!(hi.update(&raised_hand(), cursor, t(100)), vec![]);
        assert!(!hi.is_pinching());
        assert!(hi.is_dragging());
    }

    #[test]
    fn test_partial_hand_is_ignored() {
        let mut hi = hand_interaction();
        let lms = vec![Landmark::new(0.5, 0.5); 9];
        assert_eq!(hi.update(&lms, Point2D::new(0.0, 0.0), t(0)), vec![]);
        assert!(!hi.is_pinching());
    }

    #[test]
    fn test_blink_then_double_blink() {
        let config = EyeConfig::default();
        let mut blink = BlinkDetector::new(&config);
        let mut cooldown = ClickCooldown::new(config.click_cooldown_secs);

        assert_eq!(blink.update(0.01, t(0), &mut cooldown), None);
        assert_eq!(blink.update(0.001, t(30), &mut cooldown), None);
        assert_eq!(
            blink.update(0.001, t(60), &mut cooldown),
            Some(PointerAction::LeftClick)
        );

        // Eye reopens, history drains
        for i in 0..5 {
            blink.update(0.01, t(100 + i * 30), &mut cooldown);
        }
        assert!(!blink.is_blinking());

        blink.update(0.001, t(400), &mut cooldown);
        assert_eq!(
            blink.update(0.001, t(430), &mut cooldown),
            Some(PointerAction::DoubleClick)
        );
    }

    #[test]
    fn test_dwell_click() {
        let config = EyeConfig::default();
        let mut dwell = DwellDetector::new(&config);
        let mut cooldown = ClickCooldown::new(config.click_cooldown_secs);

        assert_eq!(dwell.update(Point2D::new(100.0, 100.0), t(0), &mut cooldown), None);
        assert_eq!(dwell.update(Point2D::new(110.0, 105.0), t(500), &mut cooldown), None);
        assert_eq!(
            dwell.update(Point2D::new(105.0, 110.0), t(1000), &mut cooldown),
            Some(PointerAction::LeftClick)
        );
        // Timer restarted
        assert_eq!(dwell.update(Point2D::new(100.0, 100.0), t(1500), &mut cooldown), None);

        // Leaving the radius re-anchors
        assert_eq!(dwell.update(Point2D::new(300.0, 100.0), t(2100), &mut cooldown), None);
        assert_eq!(dwell.update(Point2D::new(300.0, 100.0), t(2600), &mut cooldown), None);
    }

    #[test]
    fn test_edge_scroll() {
        let mut edge = EdgeScroller::new(&EyeConfig::default());

        assert_eq!(edge.update(0.5, t(0)), None);
        assert_eq!(edge.update(0.02, t(10)), Some(PointerAction::Scroll { amount: 80 }));
        assert_eq!(edge.update(0.02, t(40)), None);
        assert_eq!(edge.update(0.97, t(80)), Some(PointerAction::Scroll { amount: -80 }));
    }

    #[test]
    fn test_eye_interaction_shares_cooldown() {
        let mut config = EyeConfig::default();
        config.edge_scroll_enabled = false;
        config.dwell_time_secs = 0.0;
        let mut eye = EyeInteraction::new(config, screen());

        let mut face = vec![Landmark::new(0.5, 0.5); 478];
        face[145] = Landmark::new(0.5, 0.4005);
        face[159] = Landmark::new(0.5, 0.4);

        let cursor = Some(Point2D::new(500.0, 500.0));
        assert_eq!(eye.update(&face, cursor, None, t(0)), vec![]);
        // Second closed sample blinks; the dwell click is held back by the cooldown
        assert_eq!(
            eye.update(&face, cursor, None, t(30)),
            vec![PointerAction::LeftClick]
        );
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&PointerAction::Scroll { amount: -3 }).unwrap();
        assert_eq!(json, r#"{"action":"scroll","amount":-3}"#);
        let json = serde_json::to_string(&PointerAction::LeftClick).unwrap();
        assert_eq!(json, r#"{"action":"left_click"}"#);
    }
}
