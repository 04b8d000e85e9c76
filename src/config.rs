//! Configuration for tracking sessions
//!
//! Every threshold used by the interaction detectors lives here. A config is
//! built from defaults, optionally a JSON file, and then environment overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use crate::error::HandsfreeError;
use crate::vision::cursor::DEFAULT_SMOOTHING;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HandsfreeConfig {
    /// Cursor filter settings
    #[serde(default)]
    pub cursor: CursorConfig,
    /// Target screen geometry
    #[serde(default)]
    pub screen: ScreenConfig,
    /// Hand-mode interaction settings
    #[serde(default)]
    pub hand: HandConfig,
    /// Eye-mode interaction settings
    #[serde(default)]
    pub eye: EyeConfig,
}

/// Cursor filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Smoothing coefficient (0-1]
    pub smoothing: f64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

/// Screen geometry (pixels)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Hand-mode configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandConfig {
    /// Thumb-index distance that starts a pinch (normalized)
    pub pinch_close_threshold: f64,
    /// Thumb-index distance that ends a pinch (normalized)
    pub pinch_release_threshold: f64,
    /// Pinch held at least this long releases as a right click
    pub hold_right_click_secs: f64,
    /// Minimum time between clicks
    pub click_cooldown_secs: f64,
    /// Scroll by moving vertically while pinched
    pub scroll_enabled: bool,
    /// Scroll units per full screen height of movement
    pub scroll_gain: f64,
    /// Minimum time between scroll samples
    pub scroll_sample_ms: u64,
    /// Drag while index and middle fingers are raised
    pub spread_drag_enabled: bool,
    /// Height above the wrist for a fingertip to count as raised (normalized)
    pub finger_extension_threshold: f64,
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            pinch_close_threshold: 0.04,
            pinch_release_threshold: 0.055,
            hold_right_click_secs: 0.9,
            click_cooldown_secs: 0.25,
            scroll_enabled: true,
            scroll_gain: 1200.0,
            scroll_sample_ms: 40,
            spread_drag_enabled: true,
            finger_extension_threshold: 0.2,
        }
    }
}

/// Eye-mode configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeConfig {
    /// Eyelid gap below which the eye counts as closed (normalized)
    pub blink_gap_threshold: f64,
    /// Closed samples (out of the last five) needed for a blink
    pub blink_consecutive_frames: usize,
    /// Two blinks within this window form a double click
    pub double_blink_window_secs: f64,
    /// Minimum time between clicks
    pub click_cooldown_secs: f64,
    /// Click after holding the gaze still
    pub dwell_enabled: bool,
    /// How long the gaze must hold still
    pub dwell_time_secs: f64,
    /// How still the gaze must be (pixels)
    pub dwell_radius_px: f64,
    /// Scroll when looking at the top or bottom edge
    pub edge_scroll_enabled: bool,
    /// Fraction of the screen height treated as an edge
    pub edge_margin: f64,
    /// Scroll units per tick
    pub scroll_speed: i32,
    /// Minimum time between scroll ticks
    pub scroll_every_ms: u64,
}

impl Default for EyeConfig {
    fn default() -> Self {
        Self {
            blink_gap_threshold: 0.004,
            blink_consecutive_frames: 2,
            double_blink_window_secs: 0.8,
            click_cooldown_secs: 0.25,
            dwell_enabled: true,
            dwell_time_secs: 1.0,
            dwell_radius_px: 30.0,
            edge_scroll_enabled: true,
            edge_margin: 0.08,
            scroll_speed: 80,
            scroll_every_ms: 60,
        }
    }
}

impl HandsfreeConfig {
    /// Load configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, HandsfreeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, HandsfreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, HandsfreeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Defaults, then an optional file, then environment overrides
    pub fn resolve(path: Option<&Path>) -> Result<Self, HandsfreeError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment-like lookup.
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        override_from(&lookup, "SMOOTHING", &mut self.cursor.smoothing);

        let hand = &mut self.hand;
        override_from(&lookup, "CLICK_COOLDOWN", &mut hand.click_cooldown_secs);
        override_from(&lookup, "PINCH_CLOSE_THRESH", &mut hand.pinch_close_threshold);
        override_from(&lookup, "PINCH_RELEASE_THRESH", &mut hand.pinch_release_threshold);
        override_from(&lookup, "PINCH_HOLD_RIGHTCLICK_S", &mut hand.hold_right_click_secs);
        override_flag(&lookup, "SCROLL_ENABLED", &mut hand.scroll_enabled);
        override_from(&lookup, "SCROLL_GAIN", &mut hand.scroll_gain);
        override_from(&lookup, "SCROLL_SAMPLE_MS", &mut hand.scroll_sample_ms);
        override_flag(&lookup, "SPREAD_DRAG_ENABLED", &mut hand.spread_drag_enabled);
        override_from(&lookup, "FINGER_EXT_THRESH", &mut hand.finger_extension_threshold);

        let eye = &mut self.eye;
        override_from(&lookup, "CLICK_COOLDOWN", &mut eye.click_cooldown_secs);
        override_flag(&lookup, "DWELL_ENABLED", &mut eye.dwell_enabled);
        override_from(&lookup, "DWELL_TIME_S", &mut eye.dwell_time_secs);
        override_from(&lookup, "DWELL_RADIUS_PX", &mut eye.dwell_radius_px);
        override_from(&lookup, "BLINK_GAP_THRESH", &mut eye.blink_gap_threshold);
        override_from(&lookup, "BLINK_CONSEC_FRAMES", &mut eye.blink_consecutive_frames);
        override_from(&lookup, "DOUBLE_BLINK_WINDOW_S", &mut eye.double_blink_window_secs);
        override_flag(&lookup, "EDGE_SCROLL_ENABLED", &mut eye.edge_scroll_enabled);
        override_from(&lookup, "EDGE_MARGIN", &mut eye.edge_margin);
        override_from(&lookup, "SCROLL_SPEED", &mut eye.scroll_speed);
        override_from(&lookup, "SCROLL_EVERY_MS", &mut eye.scroll_every_ms);
    }

    /// Reject values the detectors cannot work with
    pub fn validate(&self) -> Result<(), HandsfreeError> {
        let s = self.cursor.smoothing;
        if !(s.is_finite() && s > 0.0 && s <= 1.0) {
            return Err(invalid(format!("cursor.smoothing must be in (0, 1], got {}", s)));
        }

        if !(self.screen.width > 0.0 && self.screen.height > 0.0)
            || !self.screen.width.is_finite()
            || !self.screen.height.is_finite()
        {
            return Err(invalid(format!(
                "screen size must be positive, got {}x{}",
                self.screen.width, self.screen.height
            )));
        }

        let hand = &self.hand;
        check_non_negative("hand.pinch_close_threshold", hand.pinch_close_threshold)?;
        if !(hand.pinch_release_threshold.is_finite()
            && hand.pinch_release_threshold > hand.pinch_close_threshold)
        {
            return Err(invalid(format!(
                "hand.pinch_release_threshold ({}) must exceed hand.pinch_close_threshold ({})",
                hand.pinch_release_threshold, hand.pinch_close_threshold
            )));
        }
        check_non_negative("hand.hold_right_click_secs", hand.hold_right_click_secs)?;
        check_non_negative("hand.click_cooldown_secs", hand.click_cooldown_secs)?;
        check_non_negative("hand.scroll_gain", hand.scroll_gain)?;
        check_non_negative("hand.finger_extension_threshold", hand.finger_extension_threshold)?;

        let eye = &self.eye;
        check_non_negative("eye.blink_gap_threshold", eye.blink_gap_threshold)?;
        if eye.blink_consecutive_frames == 0 || eye.blink_consecutive_frames > BLINK_HISTORY_LEN {
            return Err(invalid(format!(
                "eye.blink_consecutive_frames must be between 1 and {}, got {}",
                BLINK_HISTORY_LEN, eye.blink_consecutive_frames
            )));
        }
        check_non_negative("eye.double_blink_window_secs", eye.double_blink_window_secs)?;
        check_non_negative("eye.click_cooldown_secs", eye.click_cooldown_secs)?;
        check_non_negative("eye.dwell_time_secs", eye.dwell_time_secs)?;
        check_non_negative("eye.dwell_radius_px", eye.dwell_radius_px)?;
        if !(eye.edge_margin.is_finite() && (0.0..0.5).contains(&eye.edge_margin)) {
            return Err(invalid(format!(
                "eye.edge_margin must be in [0, 0.5), got {}",
                eye.edge_margin
            )));
        }

        Ok(())
    }
}

/// Number of eyelid samples kept by the blink detector
pub const BLINK_HISTORY_LEN: usize = 5;

fn invalid(message: String) -> HandsfreeError {
    HandsfreeError::InvalidConfig(message)
}

fn check_non_negative(name: &str, value: f64) -> Result<(), HandsfreeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be a non-negative number, got {}", name, value)))
    }
}

fn override_from<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse::<T>() {
            Ok(value) => *slot = value,
            Err(_) => warn!(key, value = %raw, "ignoring unparsable override"),
        }
    }
}

/// Flags follow the "1 means on" convention; anything else is off
fn override_flag<F>(lookup: &F, key: &str, slot: &mut bool)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *slot = raw.trim() == "1";
    }
}
