//! Hand signal from the external vision collaborator
//!
//! Overwritten wholesale on every update; the most recent value wins.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Gesture label reported by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HandClassification {
    Open,
    Closed,
    #[default]
    Unknown,
}

impl HandClassification {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => HandClassification::Open,
            "CLOSED" | "FIST" => HandClassification::Closed,
            _ => HandClassification::Unknown,
        }
    }
}

/// Latest hand reading, normalized to the camera frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandSignal {
    pub classification: HandClassification,
    /// Horizontal position in [0, 1]
    pub x: f32,
    /// Vertical position in [0, 1], 0 at the top
    pub y: f32,
    /// False when no hand was detected with confidence
    pub present: bool,
}

impl HandSignal {
    /// No hand in view
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn new(classification: HandClassification, x: f32, y: f32, present: bool) -> Self {
        Self {
            classification,
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
            present,
        }
    }

    /// Position if a hand is present
    pub fn position(&self) -> Option<Vec2> {
        self.present.then(|| Vec2::new(self.x, self.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_parse() {
        assert_eq!(HandClassification::from_str("OPEN"), HandClassification::Open);
        assert_eq!(HandClassification::from_str(" closed "), HandClassification::Closed);
        assert_eq!(HandClassification::from_str("wave"), HandClassification::Unknown);
    }

    #[test]
    fn test_position_clamped_and_gated() {
        let s = HandSignal::new(HandClassification::Open, 1.4, -0.2, true);
        assert_eq!(s.position(), Some(Vec2::new(1.0, 0.0)));
        assert_eq!(HandSignal::absent().position(), None);
    }
}
