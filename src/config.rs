//! Triage policy configuration.
//!
//! Thresholds and lexicons encode clinical policy, so they are loaded from a
//! JSON file rather than compiled in. Resolution order:
//! 1. `TRIAGE_CONFIG` environment variable (path to a JSON file)
//! 2. `<config dir>/clinical-triage/triage.json`
//! 3. Built-in defaults

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "clinical-triage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "TRIAGE_CONFIG";

const CONFIG_FILE_NAME: &str = "triage.json";

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clinical_triage=info,warn"
}

/// Directory holding the user-level config file, if the platform has one.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Full path of the user-level config file.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid triage policy: {0}")]
    Invalid(String),
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Safety thresholds shared by the extraction agent and the risk model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Scores at or above this are high-risk. Critical symptoms force it.
    pub critical_risk: f32,
    /// Confidence below this mandates human review.
    pub confidence_min: f32,
    /// Lower bound of the elevated display band.
    pub elevated_risk: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            critical_risk: 0.85,
            confidence_min: 0.70,
            elevated_risk: 0.30,
        }
    }
}

/// Complete triage policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub thresholds: Thresholds,
    /// Symptoms that force the high-risk band regardless of other signals.
    pub critical_symptoms: Vec<String>,
    /// Non-critical symptom term → severity weight in [0,1].
    pub symptom_severity: BTreeMap<String, f32>,
    /// Conditions recognised as medical history.
    pub history_conditions: Vec<String>,
    /// Cues that negate a following finding ("denies fever").
    pub negation_cues: Vec<String>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        let critical_symptoms = [
            "chest pain",
            "shortness of breath",
            "syncope",
            "difficulty breathing",
            "severe bleeding",
            "slurred speech",
            "facial droop",
            "unresponsive",
            "seizure",
            "hemoptysis",
            "anaphylaxis",
        ];

        let symptom_severity = [
            ("minor itch", 0.05),
            ("itch", 0.05),
            ("runny nose", 0.05),
            ("sore throat", 0.10),
            ("rash", 0.15),
            ("cough", 0.15),
            ("fatigue", 0.15),
            ("back pain", 0.20),
            ("nausea", 0.20),
            ("headache", 0.25),
            ("diarrhea", 0.25),
            ("dizziness", 0.35),
            ("fever", 0.35),
            ("vomiting", 0.35),
            ("abdominal pain", 0.40),
            ("palpitations", 0.45),
            ("confusion", 0.55),
        ];

        let history_conditions = [
            "hypertension",
            "diabetes",
            "asthma",
            "copd",
            "coronary artery disease",
            "heart failure",
            "atrial fibrillation",
            "stroke",
            "chronic kidney disease",
            "hyperlipidemia",
            "hypothyroidism",
            "cancer",
        ];

        let negation_cues = [
            "denies",
            "denied",
            "no",
            "negative for",
            "without",
            "not",
            "absence of",
            "free of",
        ];

        Self {
            thresholds: Thresholds::default(),
            critical_symptoms: critical_symptoms.iter().map(|s| s.to_string()).collect(),
            symptom_severity: symptom_severity
                .iter()
                .map(|(term, weight)| (term.to_string(), *weight))
                .collect(),
            history_conditions: history_conditions.iter().map(|s| s.to_string()).collect(),
            negation_cues: negation_cues.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════

impl TriageConfig {
    /// Resolve config from the environment, the user config dir, or defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            tracing::info!(path = %path, "Loading triage config from {CONFIG_ENV_VAR}");
            return Self::from_path(Path::new(&path));
        }

        if let Some(path) = default_config_path().filter(|p| p.is_file()) {
            tracing::info!(path = %path.display(), "Loading triage config");
            return Self::from_path(&path);
        }

        tracing::debug!("No triage config file found, using built-in policy");
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate. Missing keys fall back to defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        for (name, value) in [
            ("critical_risk", t.critical_risk),
            ("confidence_min", t.confidence_min),
            ("elevated_risk", t.elevated_risk),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }

        if t.elevated_risk >= t.critical_risk {
            return Err(ConfigError::Invalid(format!(
                "elevated_risk ({}) must be below critical_risk ({})",
                t.elevated_risk, t.critical_risk
            )));
        }

        if self.critical_symptoms.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "critical_symptoms must name at least one symptom".into(),
            ));
        }

        if self.symptom_severity.keys().any(|term| term.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "symptom_severity terms must not be blank".into(),
            ));
        }

        if let Some((term, weight)) = self
            .symptom_severity
            .iter()
            .find(|(_, w)| !(0.0..=1.0).contains(*w))
        {
            return Err(ConfigError::Invalid(format!(
                "severity weight for '{term}' must be in [0, 1], got {weight}"
            )));
        }

        Ok(())
    }

    /// Every symptom term the classifier should recognise.
    pub fn symptom_terms(&self) -> impl Iterator<Item = &str> {
        self.critical_symptoms
            .iter()
            .map(String::as_str)
            .chain(self.symptom_severity.keys().map(String::as_str))
    }
}
