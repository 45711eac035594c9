use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::format::DocumentCategory;
use super::ExtractionError;
use crate::models::{ArtifactKind, ExtractedRecord};

/// Namespace for content-derived artifact ids.
const ARTIFACT_NAMESPACE: Uuid = Uuid::from_u128(0x6c1b_7a52_93e4_4d0f_9a3e_51c2_d8f0_a417);

/// Raw clinical input handed to an extraction agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Scanned or digital document (PDF, image, plain text file).
    Document { name: String, bytes: Vec<u8> },
    /// Free-text clinical note.
    Note(String),
}

impl Artifact {
    pub fn document(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Artifact::Document {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn note(text: impl Into<String>) -> Self {
        Artifact::Note(text.into())
    }

    /// Read a document from disk. The file name is kept for format checks.
    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        Ok(Artifact::Document { name, bytes })
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Document { .. } => ArtifactKind::Document,
            Artifact::Note(_) => ArtifactKind::Note,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Artifact::Document { name, .. } => Some(name),
            Artifact::Note(_) => None,
        }
    }

    pub fn content(&self) -> &[u8] {
        match self {
            Artifact::Document { bytes, .. } => bytes,
            Artifact::Note(text) => text.as_bytes(),
        }
    }

    /// Deterministic id: UUID v5 over the SHA-256 of kind and content.
    pub fn id(&self) -> Uuid {
        let mut hasher = Sha256::new();
        hasher.update(self.kind().as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(self.content());
        Uuid::new_v5(&ARTIFACT_NAMESPACE, &hasher.finalize())
    }
}

/// How text was obtained from a document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadMethod {
    PlainTextRead,
    TextLayer,
    Ocr,
    Note,
}

/// Text recovered from an artifact plus the reader's own confidence in it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadText {
    pub text: String,
    pub confidence: f32,
    pub method: ReadMethod,
}

/// OCR / text-layer back end for binary documents (allows mocking for tests).
pub trait DocumentReader: Send + Sync {
    fn supports(&self, category: DocumentCategory) -> bool;

    fn read(&self, bytes: &[u8], category: DocumentCategory) -> Result<ReadText, ExtractionError>;
}

/// Turns a raw clinical artifact into a structured record.
pub trait ExtractionAgent: Send + Sync {
    fn extract(&self, artifact: &Artifact) -> Result<ExtractedRecord, ExtractionError>;
}
