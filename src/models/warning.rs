use serde::{Deserialize, Serialize};

use super::diagnosis::CodeIssue;
use super::vital_sign::VitalType;

/// Data-quality finding attached to an extracted record.
///
/// Warnings never reject a record. The ones that can hide a recognition error
/// force manual review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// Self-reported confidence is below the review threshold.
    LowConfidence { confidence: f32, threshold: f32 },
    /// Diagnosis code is structurally invalid.
    MalformedCode {
        code: String,
        issue: CodeIssue,
        suggestion: Option<String>,
    },
    /// Patient identity could not be resolved.
    UnresolvedIdentity,
    /// A text field contains characters typical of OCR noise (`J0hn`).
    RecognitionNoise { field: String, value: String },
    /// Date of birth is not a valid calendar date.
    MalformedDate { value: String },
    /// Vital sign found but outside physiological range; dropped.
    ImplausibleVital { vital: VitalType, raw: String },
    /// Term is both affirmed and negated; kept as present.
    ConflictingMention { term: String },
    /// Critical symptom read only as negated or as past history.
    SuppressedCriticalMention { term: String },
    /// Source uses hedged or questioning language.
    HedgedLanguage,
    /// Nothing clinically recognisable was found.
    NoClinicalFindings,
}

impl DataQualityWarning {
    pub fn requires_review(&self) -> bool {
        !matches!(
            self,
            DataQualityWarning::HedgedLanguage | DataQualityWarning::NoClinicalFindings
        )
    }

    /// Short label for logs. Carries no patient data.
    pub fn label(&self) -> &'static str {
        match self {
            DataQualityWarning::LowConfidence { .. } => "low_confidence",
            DataQualityWarning::MalformedCode { .. } => "malformed_code",
            DataQualityWarning::UnresolvedIdentity => "unresolved_identity",
            DataQualityWarning::RecognitionNoise { .. } => "recognition_noise",
            DataQualityWarning::MalformedDate { .. } => "malformed_date",
            DataQualityWarning::ImplausibleVital { .. } => "implausible_vital",
            DataQualityWarning::ConflictingMention { .. } => "conflicting_mention",
            DataQualityWarning::SuppressedCriticalMention { .. } => "suppressed_critical_mention",
            DataQualityWarning::HedgedLanguage => "hedged_language",
            DataQualityWarning::NoClinicalFindings => "no_clinical_findings",
        }
    }
}
