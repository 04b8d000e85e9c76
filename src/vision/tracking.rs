//! Pointer targets from landmarks
//!
//! Picks the raw point a cursor should follow out of a hand or face landmark
//! snapshot, and maps between normalized frame units and screen pixels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ScreenConfig;
use crate::error::HandsfreeError;
use crate::types::{Landmark, Point2D};
use crate::vision::gesture::{hand, PINCH_MIN_LANDMARKS};

/// Face mesh landmark indices (refined mesh with iris points)
pub mod face {
    /// Right iris centre
    pub const RIGHT_IRIS: usize = 469;
    /// Left iris centre
    pub const LEFT_IRIS: usize = 474;
    /// Lower eyelid of the tracked eye
    pub const LOWER_EYELID: usize = 145;
    /// Upper eyelid of the tracked eye
    pub const UPPER_EYELID: usize = 159;

    /// Fewest landmarks that include both iris centres
    pub const IRIS_MIN_LANDMARKS: usize = LEFT_IRIS + 1;
}

/// Which body part drives the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingMode {
    Hand,
    Eye,
}

impl TrackingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingMode::Hand => "hand",
            TrackingMode::Eye => "eye",
        }
    }

    /// Raw pointer target in normalized frame units
    pub fn target(&self, landmarks: &[Landmark]) -> Option<Point2D> {
        match self {
            TrackingMode::Hand => hand_pointer(landmarks),
            TrackingMode::Eye => gaze_point(landmarks),
        }
    }
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackingMode {
    type Err = HandsfreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hand" => Ok(TrackingMode::Hand),
            "eye" => Ok(TrackingMode::Eye),
            other => Err(HandsfreeError::UnsupportedMode(other.to_string())),
        }
    }
}

/// Index fingertip of a hand snapshot
pub fn hand_pointer(landmarks: &[Landmark]) -> Option<Point2D> {
    if landmarks.len() < PINCH_MIN_LANDMARKS {
        return None;
    }
    landmarks.get(hand::INDEX_TIP).map(Landmark::point)
}

/// Midpoint of both iris centres of a face snapshot
pub fn gaze_point(landmarks: &[Landmark]) -> Option<Point2D> {
    let left = landmarks.get(face::LEFT_IRIS)?;
    let right = landmarks.get(face::RIGHT_IRIS)?;
    Some(Point2D::new(
        (left.x + right.x) / 2.0,
        (left.y + right.y) / 2.0,
    ))
}

/// Vertical eyelid gap of the tracked eye, if the mesh has it
pub fn eyelid_gap(landmarks: &[Landmark]) -> Option<f64> {
    let lower = landmarks.get(face::LOWER_EYELID)?;
    let upper = landmarks.get(face::UPPER_EYELID)?;
    Some(lower.y - upper.y)
}

/// Maps normalized frame coordinates onto a screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenMapping {
    pub width: f64,
    pub height: f64,
}

impl ScreenMapping {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn to_screen(&self, normalized: Point2D) -> Point2D {
        Point2D::new(normalized.x * self.width, normalized.y * self.height)
    }

    pub fn to_normalized(&self, pixels: Point2D) -> Point2D {
        Point2D::new(pixels.x / self.width, pixels.y / self.height)
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.width / 2.0, self.height / 2.0)
    }
}

impl From<&ScreenConfig> for ScreenMapping {
    fn from(config: &ScreenConfig) -> Self {
        Self::new(config.width, config.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_pointer_uses_index_tip() {
        let mut lms = vec![Landmark::new(0.0, 0.0); hand::LANDMARK_COUNT];
        lms[hand::INDEX_TIP] = Landmark::new(0.3, 0.7);
        assert_eq!(hand_pointer(&lms), Some(Point2D::new(0.3, 0.7)));
        assert_eq!(hand_pointer(&lms[..5]), None);
    }

    #[test]
    fn test_gaze_point_averages_irises() {
        let mut lms = vec![Landmark::new(0.0, 0.0); face::IRIS_MIN_LANDMARKS];
        lms[face::LEFT_IRIS] = Landmark::new(0.6, 0.4);
        lms[face::RIGHT_IRIS] = Landmark::new(0.4, 0.6);
        assert_eq!(gaze_point(&lms), Some(Point2D::new(0.5, 0.5)));
        assert_eq!(gaze_point(&lms[..face::LEFT_IRIS]), None);
    }

    #[test]
    fn test_eyelid_gap() {
        let mut lms = vec![Landmark::new(0.0, 0.0); 200];
        lms[face::LOWER_EYELID] = Landmark::new(0.5, 0.41);
        lms[face::UPPER_EYELID] = Landmark::new(0.5, 0.40);
        let gap = eyelid_gap(&lms).unwrap();
        assert!((gap - 0.01).abs() < 1e-12);
        assert_eq!(eyelid_gap(&lms[..100]), None);
    }

    #[test]
    fn test_screen_mapping() {
        let screen = ScreenMapping::new(1920.0, 1080.0);
        assert_eq!(screen.center(), Point2D::new(960.0, 540.0));
        assert_eq!(
            screen.to_screen(Point2D::new(0.5, 0.25)),
            Point2D::new(960.0, 270.0)
        );
        assert_eq!(
            screen.to_normalized(Point2D::new(960.0, 270.0)),
            Point2D::new(0.5, 0.25)
        );
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Hand".parse::<TrackingMode>().unwrap(), TrackingMode::Hand);
        assert_eq!("eye".parse::<TrackingMode>().unwrap(), TrackingMode::Eye);
        assert!(matches!(
            "voice".parse::<TrackingMode>(),
            Err(HandsfreeError::UnsupportedMode(_))
        ));
    }
}
