//! Static hand gesture classification
//!
//! Evaluates a single hand landmark snapshot against fixed geometric
//! predicates. All distances are in normalized frame units. Predicates are
//! independent, so one snapshot can satisfy several labels at once; choosing
//! between them is left to the consumer.

use crate::types::{GestureLabel, GestureSet, Landmark};

/// Hand landmark indices (21-point hand model)
pub mod hand {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_BASE: usize = 5;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_BASE: usize = 9;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_BASE: usize = 13;
    pub const RING_TIP: usize = 16;
    pub const PINKY_BASE: usize = 17;
    pub const PINKY_TIP: usize = 20;

    /// Number of points in a full hand snapshot
    pub const LANDMARK_COUNT: usize = 21;
}

/// Thumb and index tips closer than this form a pinch
pub const PINCH_THRESHOLD: f64 = 0.05;

/// Thumb and pinky tips farther apart than this form an open palm
pub const OPEN_PALM_THRESHOLD: f64 = 0.25;

/// A fingertip closer than this to its base joint is folded
pub const FOLDED_THRESHOLD: f64 = 0.05;

/// A fingertip farther than this from its base joint is extended
pub const EXTENDED_THRESHOLD: f64 = 0.07;

/// Fewest landmarks a pinch check needs (thumb tip through index tip)
pub const PINCH_MIN_LANDMARKS: usize = 9;

const INDEX: (usize, usize) = (hand::INDEX_TIP, hand::INDEX_BASE);
const MIDDLE: (usize, usize) = (hand::MIDDLE_TIP, hand::MIDDLE_BASE);
const RING: (usize, usize) = (hand::RING_TIP, hand::RING_BASE);
const PINKY: (usize, usize) = (hand::PINKY_TIP, hand::PINKY_BASE);

/// Euclidean distance between two landmarks by index.
///
/// A missing landmark yields `f64::INFINITY`.
pub fn landmark_distance(landmarks: &[Landmark], a: usize, b: usize) -> f64 {
    match (landmarks.get(a), landmarks.get(b)) {
        (Some(p), Some(q)) => p.point().distance_to(&q.point()),
        _ => f64::INFINITY,
    }
}

fn is_folded(landmarks: &[Landmark], (tip, base): (usize, usize)) -> bool {
    landmark_distance(landmarks, tip, base) < FOLDED_THRESHOLD
}

fn is_extended(landmarks: &[Landmark], (tip, base): (usize, usize)) -> bool {
    let d = landmark_distance(landmarks, tip, base);
    d.is_finite() && d > EXTENDED_THRESHOLD
}

fn has_full_hand(landmarks: &[Landmark]) -> bool {
    landmarks.len() >= hand::LANDMARK_COUNT
}

/// Classifier for static hand gestures
pub struct GestureClassifier;

impl GestureClassifier {
    /// Return every gesture whose predicate holds for this snapshot
    pub fn classify(landmarks: &[Landmark]) -> GestureSet {
        let predicates: [(GestureLabel, fn(&[Landmark]) -> bool); 5] = [
            (GestureLabel::Pinch, Self::is_pinching),
            (GestureLabel::OpenPalm, Self::is_open_palm),
            (GestureLabel::Fist, Self::is_fist),
            (GestureLabel::Point, Self::is_pointing),
            (GestureLabel::Peace, Self::is_peace_sign),
        ];

        predicates
            .iter()
            .filter(|(_, predicate)| predicate(landmarks))
            .map(|(label, _)| *label)
            .collect()
    }

    /// Thumb tip close to index tip
    pub fn is_pinching(landmarks: &[Landmark]) -> bool {
        landmarks.len() >= PINCH_MIN_LANDMARKS
            && landmark_distance(landmarks, hand::THUMB_TIP, hand::INDEX_TIP) < PINCH_THRESHOLD
    }

    /// Thumb tip far from pinky tip
    pub fn is_open_palm(landmarks: &[Landmark]) -> bool {
        if !has_full_hand(landmarks) {
            return false;
        }
        let d = landmark_distance(landmarks, hand::THUMB_TIP, hand::PINKY_TIP);
        d.is_finite() && d > OPEN_PALM_THRESHOLD
    }

    /// Every fingertip close to its base joint
    pub fn is_fist(landmarks: &[Landmark]) -> bool {
        has_full_hand(landmarks)
            && [INDEX, MIDDLE, RING, PINKY]
                .into_iter()
                .all(|finger| is_folded(landmarks, finger))
    }

    /// Index extended, the other fingers folded
    pub fn is_pointing(landmarks: &[Landmark]) -> bool {
        has_full_hand(landmarks)
            && is_extended(landmarks, INDEX)
            && [MIDDLE, RING, PINKY]
                .into_iter()
                .all(|finger| is_folded(landmarks, finger))
    }

    /// Index and middle extended, ring and pinky folded
    pub fn is_peace_sign(landmarks: &[Landmark]) -> bool {
        has_full_hand(landmarks)
            && is_extended(landmarks, INDEX)
            && is_extended(landmarks, MIDDLE)
            && is_folded(landmarks, RING)
            && is_folded(landmarks, PINKY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A relaxed hand: every tip 0.06 above its base, thumb tip off to the side
    fn neutral_hand() -> Vec<Landmark> {
        let mut lms = vec![Landmark::new(0.5, 0.9); hand::LANDMARK_COUNT];
        lms[hand::THUMB_TIP] = Landmark::new(0.35, 0.62);
        for (i, (tip, base)) in [INDEX, MIDDLE, RING, PINKY].into_iter().enumerate() {
            let x = 0.40 + 0.05 * i as f64;
            lms[base] = Landmark::new(x, 0.60);
            lms[tip] = Landmark::new(x, 0.54);
        }
        lms
    }

    fn fold(lms: &mut [Landmark], (tip, base): (usize, usize)) {
        lms[tip] = Landmark::new(lms[base].x, lms[base].y - 0.02);
    }

    fn extend(lms: &mut [Landmark], (tip, base): (usize, usize)) {
        lms[tip] = Landmark::new(lms[base].x, lms[base].y - 0.15);
    }

    fn labels(lms: &[Landmark]) -> Vec<GestureLabel> {
        GestureClassifier::classify(lms).iter().collect()
    }

    #[test]
    fn test_neutral_hand_has_no_gesture() {
        assert_eq!(labels(&neutral_hand()), vec![]);
    }

    #[test]
    fn test_pinch_with_coincident_tips() {
        let mut lms = vec![Landmark::new(0.2, 0.2); PINCH_MIN_LANDMARKS];
        lms[hand::THUMB_TIP] = Landmark::new(0.5, 0.5);
        lms[hand::INDEX_TIP] = Landmark::new(0.5, 0.5);
        assert!(GestureClassifier::classify(&lms).contains(GestureLabel::Pinch));
    }

    #[test]
    fn test_too_few_landmarks_is_empty() {
        let lms = vec![Landmark::new(0.5, 0.5); PINCH_MIN_LANDMARKS - 1];
        assert!(GestureClassifier::classify(&lms).is_empty());
        assert!(GestureClassifier::classify(&[]).is_empty());
    }

    #[test]
    fn test_partial_hand_only_allows_pinch() {
        // Only 12 points, so the full-hand predicates stay false
        let mut lms = vec![Landmark::new(0.5, 0.5); 12];
        lms[hand::THUMB_TIP] = Landmark::new(0.5, 0.5);
        lms[hand::INDEX_TIP] = Landmark::new(0.51, 0.5);
        assert_eq!(labels(&lms), vec![GestureLabel::Pinch]);
    }

    #[test]
    fn test_fist() {
        let mut lms = neutral_hand();
        for finger in [INDEX, MIDDLE, RING, PINKY] {
            fold(&mut lms, finger);
        }
        assert_eq!(labels(&lms), vec![GestureLabel::Fist]);
    }

    #[test]
    fn test_point() {
        let mut lms = neutral_hand();
        extend(&mut lms, INDEX);
        for finger in [MIDDLE, RING, PINKY] {
            fold(&mut lms, finger);
        }
        assert_eq!(labels(&lms), vec![GestureLabel::Point]);
    }

    #[test]
    fn test_peace() {
        let mut lms = neutral_hand();
        extend(&mut lms, INDEX);
        extend(&mut lms, MIDDLE);
        fold(&mut lms, RING);
        fold(&mut lms, PINKY);
        assert_eq!(labels(&lms), vec![GestureLabel::Peace]);
    }

    #[test]
    fn test_open_palm() {
        let mut lms = neutral_hand();
        lms[hand::THUMB_TIP] = Landmark::new(0.05, 0.60);
        assert_eq!(labels(&lms), vec![GestureLabel::OpenPalm]);
    }

    #[test]
    fn test_overlapping_labels_are_all_returned() {
        // Open palm while pointing: both predicates hold, neither wins
        let mut lms = neutral_hand();
        extend(&mut lms, INDEX);
        for finger in [MIDDLE, RING, PINKY] {
            fold(&mut lms, finger);
        }
        lms[hand::THUMB_TIP] = Landmark::new(0.95, 0.95);
        assert_eq!(
            labels(&lms),
            vec![GestureLabel::OpenPalm, GestureLabel::Point]
        );
    }

    #[test]
    fn test_missing_landmark_distance_is_infinite() {
        let lms = vec![Landmark::new(0.0, 0.0); 3];
        assert!(landmark_distance(&lms, 0, 10).is_infinite());
        assert_eq!(landmark_distance(&lms, 0, 1), 0.0);
    }
}
