//! Rule-based extraction agent: artifact → sanitized text → identity,
//! findings and vitals → confidence → validated record.

use std::sync::Arc;

use super::classify::{ClinicalTextClassifier, KeywordClassifier};
use super::confidence::{base, compute_extraction_confidence, is_hedged, ConfidenceSignals};
use super::format::{detect_format, DocumentCategory};
use super::identity::{parse_identity, IdentityFields};
use super::sanitize::sanitize_extracted_text;
use super::types::{Artifact, DocumentReader, ExtractionAgent, ReadMethod, ReadText};
use super::vitals::parse_vitals;
use super::ExtractionError;
use crate::config::{ConfigError, Thresholds, TriageConfig};
use crate::models::{
    has_recognition_noise, is_unresolved_patient_id, validate_diagnosis_code, DataQualityWarning,
    ExtractedRecord, FindingKind, RecordDraft,
};

/// Production extraction agent.
///
/// Plain-text documents and notes are handled in-process. PDFs and images go
/// through the injected [`DocumentReader`]; without one they are refused.
pub struct ClinicalExtractionAgent {
    thresholds: Thresholds,
    classifier: Arc<dyn ClinicalTextClassifier>,
    reader: Option<Arc<dyn DocumentReader>>,
}

impl ClinicalExtractionAgent {
    /// Agent with the keyword classifier built from `config`.
    pub fn from_config(config: &TriageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let classifier = KeywordClassifier::from_config(config)?;
        Ok(Self::new(config.thresholds, Arc::new(classifier)))
    }

    pub fn new(thresholds: Thresholds, classifier: Arc<dyn ClinicalTextClassifier>) -> Self {
        Self {
            thresholds,
            classifier,
            reader: None,
        }
    }

    /// Attach an OCR / text-layer back end for PDFs and images.
    pub fn with_reader(mut self, reader: Arc<dyn DocumentReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    fn read_document(&self, name: &str, bytes: &[u8]) -> Result<ReadText, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::EmptyArtifact);
        }

        let format = detect_format(name, bytes);
        tracing::debug!(
            mime_type = format.mime_type,
            category = format.category.as_str(),
            "Document format detected"
        );

        match format.category {
            DocumentCategory::PlainText => {
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|e| ExtractionError::EncodingError(e.to_string()))?;
                Ok(ReadText {
                    text,
                    confidence: base::PLAIN_TEXT,
                    method: ReadMethod::PlainTextRead,
                })
            }

            category @ (DocumentCategory::Pdf | DocumentCategory::Image) => {
                let reader = self
                    .reader
                    .as_ref()
                    .filter(|r| r.supports(category))
                    .ok_or(ExtractionError::ReaderUnavailable(category.as_str()))?;
                reader.read(bytes, category)
            }

            DocumentCategory::Unsupported => Err(ExtractionError::UnsupportedFormat {
                name: name.to_string(),
                detected: format.mime_type.to_string(),
            }),
        }
    }

    fn build_draft(&self, read: &ReadText) -> Result<RecordDraft, ExtractionError> {
        let text = sanitize_extracted_text(&read.text);
        if text.is_empty() {
            return Err(ExtractionError::EmptyArtifact);
        }

        let IdentityFields {
            patient_id,
            first_name,
            last_name,
            date_of_birth,
            diagnosis_code,
        } = parse_identity(&text);

        let findings = self.classifier.classify(&text);
        let vitals = parse_vitals(&text);

        let mut warnings: Vec<DataQualityWarning> = vitals
            .rejected
            .iter()
            .map(|(vital, raw)| DataQualityWarning::ImplausibleVital {
                vital: *vital,
                raw: raw.clone(),
            })
            .collect();

        let mut symptoms = Vec::new();
        let mut symptoms_excluded = Vec::new();
        let mut medical_history = Vec::new();
        for finding in &findings {
            match (finding.kind, finding.negated) {
                (FindingKind::Symptom, false) => symptoms.push(finding.term.clone()),
                (FindingKind::Symptom, true) => symptoms_excluded.push(finding.term.clone()),
                (FindingKind::Condition, false) => medical_history.push(finding.term.clone()),
                // "no history of diabetes" adds nothing
                (FindingKind::Condition, true) => {}
            }
        }

        // A positive mention is never discarded
        symptoms_excluded.retain(|term| {
            let conflicting = symptoms.contains(term);
            if conflicting {
                push_unique(
                    &mut warnings,
                    DataQualityWarning::ConflictingMention { term: term.clone() },
                );
            }
            !conflicting
        });

        // Negated or history-only critical symptoms still go to a clinician
        for finding in findings.iter().filter(|f| f.critical) {
            let suppressed = finding.negated || finding.kind == FindingKind::Condition;
            if suppressed && !symptoms.contains(&finding.term) {
                push_unique(
                    &mut warnings,
                    DataQualityWarning::SuppressedCriticalMention {
                        term: finding.term.clone(),
                    },
                );
            }
        }

        let hedged = is_hedged(&text);
        if hedged {
            warnings.push(DataQualityWarning::HedgedLanguage);
        }

        let no_findings = findings.is_empty() && vitals.vitals.is_empty() && diagnosis_code.is_none();
        if no_findings {
            warnings.push(DataQualityWarning::NoClinicalFindings);
        }

        let signals = ConfidenceSignals {
            source_confidence: read.confidence,
            identity_resolved: patient_id
                .as_deref()
                .is_some_and(|id| !is_unresolved_patient_id(id)),
            malformed_code: diagnosis_code
                .as_deref()
                .is_some_and(|code| validate_diagnosis_code(code).is_err()),
            name_noise: [&first_name, &last_name]
                .iter()
                .any(|n| n.as_deref().is_some_and(has_recognition_noise)),
            no_findings,
            hedged,
        };

        Ok(RecordDraft {
            patient_id,
            first_name,
            last_name,
            date_of_birth,
            diagnosis_code,
            medical_history,
            symptoms,
            symptoms_excluded,
            vitals: vitals.vitals,
            confidence_score: compute_extraction_confidence(&signals),
            warnings,
        })
    }
}

fn push_unique(warnings: &mut Vec<DataQualityWarning>, warning: DataQualityWarning) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}

impl ExtractionAgent for ClinicalExtractionAgent {
    fn extract(&self, artifact: &Artifact) -> Result<ExtractedRecord, ExtractionError> {
        let artifact_id = artifact.id();
        let _span = tracing::info_span!(
            "extract",
            artifact_id = %artifact_id,
            kind = artifact.kind().as_str()
        )
        .entered();

        let read = match artifact {
            Artifact::Note(text) => ReadText {
                text: text.clone(),
                confidence: base::NOTE,
                method: ReadMethod::Note,
            },
            Artifact::Document { name, bytes } => self.read_document(name, bytes).map_err(|e| {
                tracing::warn!(error = %e, "Document could not be read");
                e
            })?,
        };

        let draft = self.build_draft(&read)?;
        let record = draft.finalize(artifact_id, &self.thresholds)?;

        let labels: Vec<&str> = record
            .warnings()
            .iter()
            .map(DataQualityWarning::label)
            .collect();
        tracing::info!(
            method = ?read.method,
            confidence = record.confidence_score(),
            symptoms = record.symptoms().len(),
            excluded = record.symptoms_excluded().len(),
            vitals = record.vitals().count(),
            review = record.requires_manual_review(),
            warnings = ?labels,
            "Extraction complete"
        );

        Ok(record)
    }
}
