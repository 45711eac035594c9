//! Extraction → risk scoring for one artifact.

use serde::Serialize;

use super::extraction::{Artifact, ExtractionAgent, ExtractionError};
use super::risk::{RiskInput, RiskModel};
use crate::models::{ExtractedRecord, RiskAssessment};

/// Everything the display layer needs for one artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageOutcome {
    pub record: ExtractedRecord,
    pub assessment: RiskAssessment,
}

impl TriageOutcome {
    /// Either stage asked for a clinician.
    pub fn review_required(&self) -> bool {
        self.record.requires_manual_review() || self.assessment.human_review_required()
    }
}

/// Runs an extraction agent then a risk model.
pub struct TriagePipeline<A, M> {
    agent: A,
    model: M,
}

impl<A: ExtractionAgent, M: RiskModel> TriagePipeline<A, M> {
    pub fn new(agent: A, model: M) -> Self {
        Self { agent, model }
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Extraction failures surface as-is; scoring cannot fail.
    pub fn process(&self, artifact: &Artifact) -> Result<TriageOutcome, ExtractionError> {
        let record = self.agent.extract(artifact)?;
        let assessment = self.model.score_with_confidence(&RiskInput::from(&record));

        let outcome = TriageOutcome { record, assessment };
        tracing::info!(
            artifact_id = %outcome.record.artifact_id(),
            score = outcome.assessment.score(),
            band = outcome.assessment.band().as_str(),
            extraction_confidence = outcome.record.confidence_score(),
            model_confidence = outcome.assessment.confidence(),
            review = outcome.review_required(),
            "Triage complete"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Thresholds, TriageConfig};
    use crate::models::RiskBand;
    use crate::pipeline::extraction::{ClinicalExtractionAgent, ScriptedExtractionAgent};
    use crate::pipeline::risk::{FixedRiskModel, PolicyRiskModel};

    fn pipeline() -> TriagePipeline<ClinicalExtractionAgent, PolicyRiskModel> {
        let config = TriageConfig::default();
        TriagePipeline::new(
            ClinicalExtractionAgent::from_config(&config).unwrap(),
            PolicyRiskModel::from_config(&config).unwrap(),
        )
    }

    #[test]
    fn critical_note_end_to_end() {
        let note = "History of hypertension. Current complaint: acute shortness of breath \
                    and left-sided chest pain. BP is 150/95. Denies fever.";
        let outcome = pipeline().process(&Artifact::note(note)).unwrap();

        assert!(outcome.assessment.score() >= 0.85);
        assert_eq!(outcome.assessment.band(), RiskBand::Critical);
        assert_eq!(outcome.assessment.band().css_color(), "rgb(255, 0, 0)");
    }

    #[test]
    fn minor_itch_end_to_end() {
        let outcome = pipeline()
            .process(&Artifact::note("Patient reports a minor itch."))
            .unwrap();
        assert_eq!(outcome.record.symptoms(), ["minor itch"]);
        assert!(outcome.assessment.score() < 0.30);
    }

    #[test]
    fn negated_critical_symptom_not_scored() {
        let outcome = pipeline()
            .process(&Artifact::note("Cough. Denies chest pain."))
            .unwrap();
        assert!(outcome.assessment.critical_matches().is_empty());
        assert!(outcome.assessment.score() < 0.85);
        assert!(outcome.review_required());
    }

    #[test]
    fn present_illness_complaint_is_critical() {
        let outcome = pipeline()
            .process(&Artifact::note(
                "Patient ID: P-1\nCough. HR 80. History of present illness: chest pain radiating to arm.",
            ))
            .unwrap();
        assert!(outcome.record.symptoms().iter().any(|s| s == "chest pain"));
        assert!(outcome.record.medical_history().is_empty());
        assert!(outcome.assessment.score() >= 0.85);
    }

    #[test]
    fn comma_after_negated_term_keeps_critical_complaint() {
        let outcome = pipeline()
            .process(&Artifact::note("Patient ID: P-1\nNo fever, chest pain since this morning."))
            .unwrap();
        assert_eq!(outcome.record.symptoms_excluded(), ["fever"]);
        assert_eq!(outcome.assessment.critical_matches(), ["chest pain"]);
        assert!(outcome.assessment.score() >= 0.85);
    }

    #[test]
    fn negated_critical_mention_never_confidently_low() {
        let outcome = pipeline()
            .process(&Artifact::note(
                "Patient ID: P-1\nCough. HR 80. Unable to walk without shortness of breath.",
            ))
            .unwrap();
        assert!(outcome.assessment.score() < 0.85);
        assert!(outcome.record.requires_manual_review());
        assert!(outcome.review_required());
    }

    #[test]
    fn extraction_review_carries_into_assessment() {
        let outcome = pipeline()
            .process(&Artifact::note("Pt. feels... maybe blue?"))
            .unwrap();
        assert!(outcome.record.requires_manual_review());
        assert!(outcome.assessment.human_review_required());
        assert!(outcome.review_required());
    }

    #[test]
    fn unsupported_artifact_stops_pipeline() {
        let result = pipeline().process(&Artifact::document(
            "unsupported_format.exe",
            b"test content".to_vec(),
        ));
        assert!(matches!(result, Err(ExtractionError::UnsupportedFormat { .. })));
    }

    #[test]
    fn scripted_doubles_compose() {
        let thresholds = Thresholds::default();
        let pipeline = TriagePipeline::new(
            ScriptedExtractionAgent::with_referral_fixtures(thresholds),
            FixedRiskModel::new(0.1, 0.95, thresholds),
        );

        let clean = pipeline
            .process(&Artifact::document("clean_referral.pdf", b"%PDF".to_vec()))
            .unwrap();
        assert!(!clean.review_required());

        let noisy = pipeline
            .process(&Artifact::document("noisy_fax.pdf", b"%PDF".to_vec()))
            .unwrap();
        assert!(noisy.review_required());
        assert!(noisy.assessment.human_review_required());
    }

    #[test]
    fn outcome_serialises_for_display() {
        let outcome = pipeline()
            .process(&Artifact::note("Chest pain. BP 150/95."))
            .unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["record"]["vitals"]["bp"], "150/95");
        assert_eq!(json["assessment"]["band"], "critical");
    }

    #[test]
    fn pipeline_shared_across_threads() {
        let pipeline = pipeline();
        let artifact = Artifact::note("Headache and nausea. HR 104.");
        let expected = pipeline.process(&artifact).unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| pipeline.process(&artifact).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
