//! Confidence-threshold escalation policy

use serde::{Deserialize, Serialize};

/// Default escalation threshold
pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// Decides whether a classification is too uncertain to answer automatically.
///
/// A confidence strictly below the threshold escalates; equality does not.
/// Values outside `[0, 1]` are compared as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    threshold: f32,
}

impl EscalationPolicy {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// `true` when the request should go to a human operator
    pub fn decide(&self, confidence: f32) -> bool {
        confidence < self.threshold
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
