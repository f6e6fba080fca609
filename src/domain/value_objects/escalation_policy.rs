use serde::{Deserialize, Serialize};

/// Thresholds that drive the escalation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    /// Turns scoring below this are unsuccessful.
    pub confidence_threshold: f32,
    /// Consecutive unsuccessful turns that hand the conversation to a human.
    pub max_unsuccessful: i32,
}

impl EscalationPolicy {
    pub fn new(confidence_threshold: f32, max_unsuccessful: i32) -> Result<Self, String> {
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(format!(
                "Confidence threshold must be within [0, 1], got {}",
                confidence_threshold
            ));
        }
        if max_unsuccessful < 1 {
            return Err(format!(
                "Unsuccessful response limit must be at least 1, got {}",
                max_unsuccessful
            ));
        }

        Ok(Self {
            confidence_threshold,
            max_unsuccessful,
        })
    }

    /// NaN scores count as unsuccessful.
    pub fn is_successful(&self, confidence: f32) -> bool {
        confidence >= self.confidence_threshold
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            max_unsuccessful: 2,
        }
    }
}
