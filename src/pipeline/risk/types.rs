use serde::{Deserialize, Serialize};

use crate::models::{ExtractedRecord, RiskAssessment, Vitals};

/// Minimal structured data the risk model scores.
///
/// Built from an [`ExtractedRecord`], or deserialised directly from JSON such
/// as `{"symptoms": ["headache"]}`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskInput {
    pub symptoms: Vec<String>,
    pub vitals: Option<Vitals>,
    pub medical_history: Vec<String>,
    /// Set when the source record already needs clinician review.
    #[serde(alias = "requires_manual_review")]
    pub upstream_review_required: bool,
}

impl RiskInput {
    pub fn from_symptoms<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symptoms: symptoms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_vitals(mut self, vitals: Vitals) -> Self {
        self.vitals = Some(vitals);
        self
    }
}

impl From<&ExtractedRecord> for RiskInput {
    fn from(record: &ExtractedRecord) -> Self {
        let vitals = record.vitals();
        Self {
            symptoms: record.symptoms().to_vec(),
            vitals: (!vitals.is_empty()).then_some(*vitals),
            medical_history: record.medical_history().to_vec(),
            upstream_review_required: record.requires_manual_review(),
        }
    }
}

/// Clinical risk scoring.
///
/// Implementations never fail: missing signals are left out of the score and
/// reported on the assessment instead.
pub trait RiskModel: Send + Sync {
    /// Risk score in [0, 1].
    fn score(&self, input: &RiskInput) -> f32 {
        self.score_with_confidence(input).score()
    }

    /// Score plus the model's own confidence and the review flag.
    fn score_with_confidence(&self, input: &RiskInput) -> RiskAssessment;
}
