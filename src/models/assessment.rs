use serde::{Deserialize, Serialize};

use super::enums::RiskBand;
use crate::config::Thresholds;

/// Input signal the risk model had to leave out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedSignal {
    MissingVitals,
    NoSymptoms,
}

/// Output of the risk model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    score: f32,
    confidence: f32,
    human_review_required: bool,
    band: RiskBand,
    critical_matches: Vec<String>,
    degraded_signals: Vec<DegradedSignal>,
}

impl RiskAssessment {
    /// Clamp score and confidence into [0,1] and derive the review flag.
    ///
    /// Review is required when model confidence is below `confidence_min` or
    /// the upstream record already needs review.
    pub fn new(
        score: f32,
        confidence: f32,
        upstream_review: bool,
        thresholds: &Thresholds,
    ) -> Self {
        let score = unit_clamp(score);
        let confidence = unit_clamp(confidence);
        Self {
            score,
            confidence,
            human_review_required: upstream_review || confidence < thresholds.confidence_min,
            band: RiskBand::from_score(score, thresholds),
            critical_matches: Vec::new(),
            degraded_signals: Vec::new(),
        }
    }

    pub fn with_critical_matches(mut self, matches: Vec<String>) -> Self {
        self.critical_matches = matches;
        self
    }

    pub fn with_degraded_signals(mut self, signals: Vec<DegradedSignal>) -> Self {
        self.degraded_signals = signals;
        self
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn human_review_required(&self) -> bool {
        self.human_review_required
    }

    pub fn band(&self) -> RiskBand {
        self.band
    }

    pub fn critical_matches(&self) -> &[String] {
        &self.critical_matches
    }

    pub fn degraded_signals(&self) -> &[DegradedSignal] {
        &self.degraded_signals
    }
}

/// Non-finite values collapse to 0.
fn unit_clamp(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
