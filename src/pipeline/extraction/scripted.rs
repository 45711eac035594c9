//! Deterministic extraction agent that serves canned drafts.
//!
//! Selection is by tag: the first script whose tag appears in the document
//! name (or note text) wins. Drafts still go through
//! [`RecordDraft::finalize`], so every record invariant holds.

use super::types::{Artifact, ExtractionAgent};
use super::ExtractionError;
use crate::config::Thresholds;
use crate::models::{ExtractedRecord, RecordDraft};

pub struct ScriptedExtractionAgent {
    thresholds: Thresholds,
    scripts: Vec<(String, RecordDraft)>,
}

impl ScriptedExtractionAgent {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            scripts: Vec::new(),
        }
    }

    pub fn with_script(mut self, tag: impl Into<String>, draft: RecordDraft) -> Self {
        self.scripts.push((tag.into(), draft));
        self
    }

    /// A clean typed referral and the same referral after a noisy fax scan.
    pub fn with_referral_fixtures(thresholds: Thresholds) -> Self {
        Self::new(thresholds)
            .with_script(
                "clean_referral",
                RecordDraft {
                    patient_id: Some("P-998877".into()),
                    first_name: Some("John".into()),
                    last_name: Some("Doe".into()),
                    date_of_birth: Some("1980-05-12".into()),
                    diagnosis_code: Some("I10".into()),
                    confidence_score: 0.99,
                    ..RecordDraft::default()
                },
            )
            .with_script(
                "noisy_fax",
                RecordDraft {
                    patient_id: Some("P-UNKNOWN".into()),
                    first_name: Some("J0hn".into()),
                    last_name: Some("Doe".into()),
                    date_of_birth: Some("1980-05-12".into()),
                    diagnosis_code: Some("110".into()),
                    confidence_score: 0.72,
                    ..RecordDraft::default()
                },
            )
    }

    fn lookup(&self, artifact: &Artifact) -> Option<&RecordDraft> {
        let haystack = match artifact {
            Artifact::Document { name, .. } => name.as_str(),
            Artifact::Note(text) => text.as_str(),
        };
        self.scripts
            .iter()
            .find(|(tag, _)| haystack.contains(tag.as_str()))
            .map(|(_, draft)| draft)
    }
}

impl ExtractionAgent for ScriptedExtractionAgent {
    fn extract(&self, artifact: &Artifact) -> Result<ExtractedRecord, ExtractionError> {
        let draft = self.lookup(artifact).ok_or_else(|| {
            tracing::debug!(kind = artifact.kind().as_str(), "No script matches artifact");
            ExtractionError::UnsupportedFormat {
                name: artifact.name().unwrap_or("note").to_string(),
                detected: "unscripted".to_string(),
            }
        })?;

        Ok(draft.clone().finalize(artifact.id(), &self.thresholds)?)
    }
}
