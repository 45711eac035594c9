use std::sync::LazyLock;

use regex::Regex;

/// Base confidence by source.
pub mod base {
    /// UTF-8 text file read directly.
    pub const PLAIN_TEXT: f32 = 0.99;

    /// Typed free-text note. Lower than a plain file because notes are terse
    /// and abbreviated.
    pub const NOTE: f32 = 0.90;
}

/// Deductions for signals correlated with recognition noise.
pub mod penalties {
    pub const UNRESOLVED_IDENTITY: f32 = 0.10;
    pub const MALFORMED_CODE: f32 = 0.20;
    pub const RECOGNITION_NOISE: f32 = 0.10;
    pub const NO_FINDINGS: f32 = 0.30;
    pub const HEDGED_LANGUAGE: f32 = 0.10;
}

static HEDGING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\?|\b(?:maybe|possibly|perhaps|unclear|uncertain|not\s+sure|questionable|illegible)\b")
        .expect("Invalid hedging regex")
});

/// What the agent observed about one extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceSignals {
    /// Reader confidence, or the base for the source type.
    pub source_confidence: f32,
    pub identity_resolved: bool,
    pub malformed_code: bool,
    pub name_noise: bool,
    pub no_findings: bool,
    pub hedged: bool,
}

/// Source confidence minus penalties, clamped to [0, 1].
pub fn compute_extraction_confidence(signals: &ConfidenceSignals) -> f32 {
    let mut confidence = if signals.source_confidence.is_finite() {
        signals.source_confidence
    } else {
        0.0
    };

    let deductions = [
        (!signals.identity_resolved, penalties::UNRESOLVED_IDENTITY),
        (signals.malformed_code, penalties::MALFORMED_CODE),
        (signals.name_noise, penalties::RECOGNITION_NOISE),
        (signals.no_findings, penalties::NO_FINDINGS),
        (signals.hedged, penalties::HEDGED_LANGUAGE),
    ];
    for (applies, penalty) in deductions {
        if applies {
            confidence -= penalty;
        }
    }

    confidence.clamp(0.0, 1.0)
}

/// Question marks or hedging words.
pub fn is_hedged(text: &str) -> bool {
    HEDGING.is_match(text)
}
