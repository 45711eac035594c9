use super::types::{RiskInput, RiskModel};
use crate::config::Thresholds;
use crate::models::RiskAssessment;

/// Risk model that always answers with the same score and confidence.
///
/// Still goes through [`RiskAssessment::new`], so clamping and the review
/// rule apply exactly as for the real model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRiskModel {
    pub score: f32,
    pub confidence: f32,
    pub thresholds: Thresholds,
}

impl FixedRiskModel {
    pub fn new(score: f32, confidence: f32, thresholds: Thresholds) -> Self {
        Self {
            score,
            confidence,
            thresholds,
        }
    }
}

impl RiskModel for FixedRiskModel {
    fn score_with_confidence(&self, input: &RiskInput) -> RiskAssessment {
        RiskAssessment::new(
            self.score,
            self.confidence,
            input.upstream_review_required,
            &self.thresholds,
        )
    }
}
