//! ICD-10-like diagnosis code checks.
//!
//! A code must start with a letter (`I10`, `E11.9`). Codes that don't are
//! recognition errors and are flagged for review, never corrected in place.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Letter, digit, alphanumeric, optional dotted extension of up to 4 chars.
static ICD10_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][0-9][0-9A-Z](?:\.[0-9A-Z]{1,4})?$").expect("Invalid ICD-10 regex")
});

/// Why a diagnosis code failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeIssue {
    Empty,
    /// First character is not alphabetic (`110` instead of `I10`).
    NonAlphabeticLead,
    /// Starts with a letter but does not have the category shape.
    InvalidStructure,
}

impl CodeIssue {
    pub fn describe(&self) -> &'static str {
        match self {
            CodeIssue::Empty => "diagnosis code is empty",
            CodeIssue::NonAlphabeticLead => "diagnosis code must start with a letter",
            CodeIssue::InvalidStructure => "diagnosis code does not match ICD-10 structure",
        }
    }
}

/// Validate a code as extracted. Case-insensitive.
pub fn validate_diagnosis_code(code: &str) -> Result<(), CodeIssue> {
    let trimmed = code.trim();
    let Some(first) = trimmed.chars().next() else {
        return Err(CodeIssue::Empty);
    };

    if !first.is_ascii_alphabetic() {
        return Err(CodeIssue::NonAlphabeticLead);
    }

    if !ICD10_SHAPE.is_match(&trimmed.to_ascii_uppercase()) {
        return Err(CodeIssue::InvalidStructure);
    }

    Ok(())
}

/// Likely intended code when the lead character is a common OCR confusion
/// (`1`→`I`, `0`→`O`, `5`→`S`, `8`→`B`, `2`→`Z`). Returned as a hint for the
/// reviewer only.
pub fn suggest_code_correction(code: &str) -> Option<String> {
    let trimmed = code.trim();
    let mut chars = trimmed.chars();
    let replacement = match chars.next()? {
        '1' => 'I',
        '0' => 'O',
        '5' => 'S',
        '8' => 'B',
        '2' => 'Z',
        _ => return None,
    };

    let candidate: String = std::iter::once(replacement).chain(chars).collect();
    validate_diagnosis_code(&candidate).ok().map(|_| candidate)
}
