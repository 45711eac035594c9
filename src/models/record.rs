//! Structured record produced by the extraction agent.
//!
//! Records are built from a [`RecordDraft`] through [`RecordDraft::finalize`],
//! which validates the structural invariants and derives the review flag.
//! After that they are read-only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::diagnosis::{suggest_code_correction, validate_diagnosis_code};
use super::vital_sign::Vitals;
use super::warning::DataQualityWarning;
use crate::config::Thresholds;

/// Sentinel patient id when identity cannot be resolved.
pub const UNKNOWN_PATIENT_ID: &str = "unknown";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Terms listed as both present and excluded: {0:?}")]
    OverlappingSymptoms(Vec<String>),

    #[error("Confidence score must be within [0, 1], got {0}")]
    InvalidConfidence(f32),
}

/// Unvalidated extraction output. Agents fill this in, then finalize it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDraft {
    pub patient_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(alias = "dob")]
    pub date_of_birth: Option<String>,
    pub diagnosis_code: Option<String>,
    pub medical_history: Vec<String>,
    pub symptoms: Vec<String>,
    pub symptoms_excluded: Vec<String>,
    pub vitals: Vitals,
    pub confidence_score: f32,
    pub warnings: Vec<DataQualityWarning>,
}

/// Output of the extraction agent.
///
/// Serialise-only. External JSON comes in as a [`RecordDraft`] and has to
/// pass [`RecordDraft::finalize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRecord {
    artifact_id: Uuid,
    patient_id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<String>,
    diagnosis_code: Option<String>,
    medical_history: Vec<String>,
    symptoms: Vec<String>,
    symptoms_excluded: Vec<String>,
    vitals: Vitals,
    confidence_score: f32,
    warnings: Vec<DataQualityWarning>,
    requires_manual_review: bool,
}

impl RecordDraft {
    /// Validate invariants, attach data-quality warnings, derive the review flag.
    pub fn finalize(
        self,
        artifact_id: Uuid,
        thresholds: &Thresholds,
    ) -> Result<ExtractedRecord, RecordError> {
        let confidence = self.confidence_score;
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(RecordError::InvalidConfidence(confidence));
        }

        let medical_history = dedup_terms(self.medical_history);
        let symptoms = dedup_terms(self.symptoms);
        let symptoms_excluded = dedup_terms(self.symptoms_excluded);

        let overlap: Vec<String> = symptoms_excluded
            .iter()
            .filter(|ex| symptoms.iter().any(|s| s.eq_ignore_ascii_case(ex)))
            .cloned()
            .collect();
        if !overlap.is_empty() {
            return Err(RecordError::OverlappingSymptoms(overlap));
        }

        let mut warnings = self.warnings;

        let patient_id = match self.patient_id.map(|id| id.trim().to_string()) {
            Some(id) if !is_unresolved_patient_id(&id) => id,
            other => {
                push_unique(&mut warnings, DataQualityWarning::UnresolvedIdentity);
                other
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| UNKNOWN_PATIENT_ID.to_string())
            }
        };

        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if let Some(value) = value.as_deref().filter(|v| has_recognition_noise(v)) {
                push_unique(
                    &mut warnings,
                    DataQualityWarning::RecognitionNoise {
                        field: field.to_string(),
                        value: value.to_string(),
                    },
                );
            }
        }

        if let Some(dob) = self.date_of_birth.as_deref() {
            if parse_date_of_birth(dob).is_none() {
                push_unique(
                    &mut warnings,
                    DataQualityWarning::MalformedDate {
                        value: dob.to_string(),
                    },
                );
            }
        }

        if let Some(code) = self.diagnosis_code.as_deref() {
            if let Err(issue) = validate_diagnosis_code(code) {
                push_unique(
                    &mut warnings,
                    DataQualityWarning::MalformedCode {
                        code: code.to_string(),
                        issue,
                        suggestion: suggest_code_correction(code),
                    },
                );
            }
        }

        if confidence < thresholds.confidence_min {
            push_unique(
                &mut warnings,
                DataQualityWarning::LowConfidence {
                    confidence,
                    threshold: thresholds.confidence_min,
                },
            );
        }

        let requires_manual_review = confidence < thresholds.confidence_min
            || warnings.iter().any(DataQualityWarning::requires_review);

        Ok(ExtractedRecord {
            artifact_id,
            patient_id,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            diagnosis_code: self.diagnosis_code,
            medical_history,
            symptoms,
            symptoms_excluded,
            vitals: self.vitals,
            confidence_score: confidence,
            warnings,
            requires_manual_review,
        })
    }
}

impl ExtractedRecord {
    pub fn artifact_id(&self) -> Uuid {
        self.artifact_id
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn date_of_birth(&self) -> Option<&str> {
        self.date_of_birth.as_deref()
    }

    pub fn diagnosis_code(&self) -> Option<&str> {
        self.diagnosis_code.as_deref()
    }

    pub fn medical_history(&self) -> &[String] {
        &self.medical_history
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn symptoms_excluded(&self) -> &[String] {
        &self.symptoms_excluded
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn confidence_score(&self) -> f32 {
        self.confidence_score
    }

    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    pub fn requires_manual_review(&self) -> bool {
        self.requires_manual_review
    }

    pub fn has_malformed_code(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, DataQualityWarning::MalformedCode { .. }))
    }

    pub fn is_identity_resolved(&self) -> bool {
        !is_unresolved_patient_id(&self.patient_id)
    }
}

/// `unknown`, `P-UNKNOWN`, or blank.
pub fn is_unresolved_patient_id(id: &str) -> bool {
    let lower = id.trim().to_ascii_lowercase();
    lower.is_empty() || lower == UNKNOWN_PATIENT_ID || lower.ends_with("-unknown")
}

/// Digits or OCR junk inside a personal name.
pub fn has_recognition_noise(name: &str) -> bool {
    name.chars()
        .any(|c| !(c.is_alphabetic() || matches!(c, ' ' | '-' | '\'' | '.')))
}

/// Accepts ISO (`1980-05-12`) and day-first slashed (`12/05/1980`) dates.
pub fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

/// Trim, drop blanks, remove case-insensitive duplicates keeping first order.
fn dedup_terms(terms: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for term in terms {
        let term = term.trim().to_string();
        if term.is_empty() || out.iter().any(|t| t.eq_ignore_ascii_case(&term)) {
            continue;
        }
        out.push(term);
    }
    out
}

fn push_unique(warnings: &mut Vec<DataQualityWarning>, warning: DataQualityWarning) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}
