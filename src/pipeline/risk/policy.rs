//! Threshold-policy risk model.
//!
//! Ordering rule: the critical-symptom check runs first and, when it fires,
//! places the score in the high-risk band no matter what else is present.
//! Otherwise a baseline from symptom severity, vitals and comorbidities is
//! used, capped just below the critical threshold.

use regex::Regex;

use super::types::{RiskInput, RiskModel};
use crate::config::{ConfigError, Thresholds, TriageConfig};
use crate::models::{DegradedSignal, RiskAssessment, Vitals};
use crate::pipeline::extraction::classify::term_pattern;
use crate::pipeline::extraction::normalize_term;

/// Scoring constants for the baseline and critical paths.
pub mod weights {
    /// Severity of a symptom absent from the lexicon.
    pub const UNKNOWN_SYMPTOM: f32 = 0.20;
    /// Added per symptom beyond the most severe one.
    pub const EXTRA_SYMPTOM: f32 = 0.05;
    pub const EXTRA_SYMPTOM_CAP: f32 = 0.15;
    /// Added per critical match beyond the first.
    pub const EXTRA_CRITICAL: f32 = 0.03;
    /// Share of the vitals bump applied on the critical path.
    pub const CRITICAL_VITALS_SHARE: f32 = 0.5;
    /// Added per recorded history condition on the baseline path.
    pub const COMORBIDITY: f32 = 0.05;
    pub const COMORBIDITY_CAP: f32 = 0.10;
    /// Gap kept between the baseline cap and `critical_risk`.
    pub const BASELINE_MARGIN: f32 = 0.01;
}

/// Model confidence constants.
pub mod confidence {
    pub const FLOOR: f32 = 0.50;
    /// Scaled by the share of recognised symptoms.
    pub const RECOGNITION_SPAN: f32 = 0.45;
    pub const NO_SYMPTOMS: f32 = 0.30;
    pub const MISSING_VITALS_PENALTY: f32 = 0.05;
}

/// Vital-sign cut-offs and the bump each contributes.
pub mod vitals_policy {
    pub const BP_CRISIS: (u16, u16) = (180, 120);
    pub const BP_HIGH: (u16, u16) = (140, 90);
    pub const BP_LOW_SYSTOLIC: u16 = 90;
    pub const HR_SEVERE: (f32, f32) = (40.0, 120.0);
    pub const HR_ABNORMAL: (f32, f32) = (50.0, 100.0);
    pub const SPO2_SEVERE: f32 = 90.0;
    pub const SPO2_LOW: f32 = 94.0;
    pub const TEMP_HIGH_FEVER: f32 = 39.5;
    pub const TEMP_FEVER: f32 = 38.0;
    pub const TEMP_HYPOTHERMIA: f32 = 35.0;
    pub const RR_SEVERE: (f32, f32) = (8.0, 30.0);
    pub const RR_ABNORMAL: (f32, f32) = (12.0, 24.0);

    pub const SEVERE: f32 = 0.25;
    pub const MODERATE: f32 = 0.15;
    pub const MILD: f32 = 0.10;
    pub const SLIGHT: f32 = 0.05;
}

struct WeightedTerm {
    weight: f32,
    regex: Regex,
}

/// Risk model driven entirely by [`TriageConfig`].
pub struct PolicyRiskModel {
    thresholds: Thresholds,
    critical: Vec<(String, Regex)>,
    severity: Vec<WeightedTerm>,
}

impl PolicyRiskModel {
    pub fn from_config(config: &TriageConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let critical = config
            .critical_symptoms
            .iter()
            .map(|raw| normalize_term(raw))
            .filter(|term| !term.is_empty())
            .map(|term| term_regex(&term).map(|regex| (term, regex)))
            .collect::<Result<Vec<_>, _>>()?;

        let severity = config
            .symptom_severity
            .iter()
            .map(|(raw, weight)| {
                let term = normalize_term(raw);
                Ok(WeightedTerm {
                    regex: term_regex(&term)?,
                    weight: *weight,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            thresholds: config.thresholds,
            critical,
            severity,
        })
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Critical terms found in any symptom, in configuration order.
    fn critical_matches(&self, symptoms: &[String]) -> Vec<String> {
        self.critical
            .iter()
            .filter(|(_, re)| symptoms.iter().any(|s| re.is_match(s)))
            .map(|(term, _)| term.clone())
            .collect()
    }

    /// Highest configured weight among lexicon terms inside `symptom`.
    fn severity_of(&self, symptom: &str) -> Option<f32> {
        self.severity
            .iter()
            .filter(|t| t.regex.is_match(symptom))
            .map(|t| t.weight)
            .reduce(f32::max)
    }

    fn is_recognised(&self, symptom: &str) -> bool {
        self.critical.iter().any(|(_, re)| re.is_match(symptom))
            || self.severity_of(symptom).is_some()
    }

    fn baseline(&self, symptoms: &[String], history: usize, bump: f32) -> f32 {
        let max_severity = symptoms
            .iter()
            .map(|s| self.severity_of(s).unwrap_or(weights::UNKNOWN_SYMPTOM))
            .reduce(f32::max)
            .unwrap_or(0.0);
        let extra = symptoms.len().saturating_sub(1) as f32 * weights::EXTRA_SYMPTOM;
        let comorbidity = history as f32 * weights::COMORBIDITY;

        let cap = self.thresholds.critical_risk - weights::BASELINE_MARGIN;
        (max_severity
            + extra.min(weights::EXTRA_SYMPTOM_CAP)
            + comorbidity.min(weights::COMORBIDITY_CAP)
            + bump)
            .min(cap)
    }

    fn model_confidence(&self, symptoms: &[String], vitals_missing: bool) -> f32 {
        let base = if symptoms.is_empty() {
            confidence::NO_SYMPTOMS
        } else {
            let recognised = symptoms.iter().filter(|s| self.is_recognised(s)).count();
            confidence::FLOOR
                + confidence::RECOGNITION_SPAN * recognised as f32 / symptoms.len() as f32
        };

        if vitals_missing {
            base - confidence::MISSING_VITALS_PENALTY
        } else {
            base
        }
    }
}

impl RiskModel for PolicyRiskModel {
    fn score_with_confidence(&self, input: &RiskInput) -> RiskAssessment {
        let symptoms: Vec<String> = input
            .symptoms
            .iter()
            .map(|s| normalize_term(s))
            .filter(|s| !s.is_empty())
            .collect();

        let vitals = input.vitals.filter(|v| !v.is_empty());
        let mut degraded = Vec::new();
        if vitals.is_none() {
            degraded.push(DegradedSignal::MissingVitals);
        }
        if symptoms.is_empty() {
            degraded.push(DegradedSignal::NoSymptoms);
        }
        if !degraded.is_empty() {
            tracing::debug!(signals = ?degraded, "Scoring with degraded input");
        }

        let bump = vitals.as_ref().map(vitals_bump).unwrap_or(0.0);
        let matches = self.critical_matches(&symptoms);

        let mut history: Vec<String> = input
            .medical_history
            .iter()
            .map(|h| normalize_term(h))
            .filter(|h| !h.is_empty())
            .collect();
        history.sort();
        history.dedup();

        let score = if matches.is_empty() {
            self.baseline(&symptoms, history.len(), bump)
        } else {
            let critical = self.thresholds.critical_risk;
            let extra = (matches.len() - 1) as f32 * weights::EXTRA_CRITICAL;
            (critical + extra + weights::CRITICAL_VITALS_SHARE * bump).clamp(critical, 1.0)
        };

        let model_confidence = self.model_confidence(&symptoms, vitals.is_none());
        let assessment = RiskAssessment::new(
            score,
            model_confidence,
            input.upstream_review_required,
            &self.thresholds,
        )
        .with_critical_matches(matches)
        .with_degraded_signals(degraded);

        tracing::debug!(
            score = assessment.score(),
            confidence = assessment.confidence(),
            band = assessment.band().as_str(),
            critical = assessment.critical_matches().len(),
            review = assessment.human_review_required(),
            "Risk scored"
        );

        assessment
    }
}

fn term_regex(term: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!(r"(?i)\b{}\b", term_pattern(term)))
        .map_err(|e| ConfigError::Invalid(format!("risk term '{term}': {e}")))
}

/// Additive risk from abnormal vitals. Each measurement contributes its worst
/// applicable tier.
pub fn vitals_bump(vitals: &Vitals) -> f32 {
    use self::vitals_policy::*;

    let bp = vitals.bp.map_or(0.0, |bp| {
        if bp.systolic >= BP_CRISIS.0 || bp.diastolic >= BP_CRISIS.1 {
            SEVERE
        } else if bp.systolic < BP_LOW_SYSTOLIC {
            MODERATE
        } else if bp.systolic >= BP_HIGH.0 || bp.diastolic >= BP_HIGH.1 {
            MILD
        } else {
            0.0
        }
    });

    let hr = vitals.heart_rate.map_or(0.0, |hr| {
        if hr < HR_SEVERE.0 || hr > HR_SEVERE.1 {
            MODERATE
        } else if hr < HR_ABNORMAL.0 || hr > HR_ABNORMAL.1 {
            MILD
        } else {
            0.0
        }
    });

    let spo2 = vitals.spo2.map_or(0.0, |s| {
        if s < SPO2_SEVERE {
            SEVERE
        } else if s < SPO2_LOW {
            MODERATE
        } else {
            0.0
        }
    });

    let temp = vitals.temperature_c.map_or(0.0, |t| {
        if t >= TEMP_HIGH_FEVER || t < TEMP_HYPOTHERMIA {
            MILD
        } else if t >= TEMP_FEVER {
            SLIGHT
        } else {
            0.0
        }
    });

    let rr = vitals.respiratory_rate.map_or(0.0, |rr| {
        if rr < RR_SEVERE.0 || rr > RR_SEVERE.1 {
            MODERATE
        } else if rr < RR_ABNORMAL.0 || rr > RR_ABNORMAL.1 {
            MILD
        } else {
            0.0
        }
    });

    bp + hr + spo2 + temp + rr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BloodPressure, RiskBand};

    fn model() -> PolicyRiskModel {
        PolicyRiskModel::from_config(&TriageConfig::default()).unwrap()
    }

    fn bp(systolic: u16, diastolic: u16) -> Vitals {
        Vitals {
            bp: Some(BloodPressure::new(systolic, diastolic).unwrap()),
            ..Vitals::default()
        }
    }

    #[test]
    fn headache_scores_in_range() {
        let input: RiskInput = serde_json::from_str(r#"{"symptoms": ["headache"]}"#).unwrap();
        let score = model().score(&input);
        assert!((0.0..=1.0).contains(&score));
        assert!(score < 0.85);
    }

    #[test]
    fn critical_symptoms_force_high_risk() {
        let input = RiskInput::from_symptoms(["chest pain", "shortness of breath"])
            .with_vitals(bp(150, 95));
        let assessment = model().score_with_confidence(&input);

        assert!(assessment.score() >= 0.85);
        assert_eq!(assessment.band(), RiskBand::Critical);
        assert_eq!(
            assessment.critical_matches(),
            ["chest pain", "shortness of breath"]
        );
        assert!(!assessment.human_review_required());
    }

    #[test]
    fn critical_term_inside_longer_phrase() {
        let input = RiskInput::from_symptoms(["Left-sided Chest Pain radiating to arm"]);
        assert!(model().score(&input) >= 0.85);
    }

    #[test]
    fn every_critical_term_alone_reaches_threshold() {
        let model = model();
        for term in TriageConfig::default().critical_symptoms {
            let score = model.score(&RiskInput::from_symptoms([term.as_str()]));
            assert!(score >= 0.85, "{term} scored {score}");
        }
    }

    #[test]
    fn critical_score_capped_at_one() {
        let vitals = Vitals {
            bp: Some(BloodPressure::new(200, 125).unwrap()),
            heart_rate: Some(150.0),
            spo2: Some(82.0),
            temperature_c: Some(40.1),
            respiratory_rate: Some(36.0),
        };
        let input = RiskInput::from_symptoms([
            "chest pain",
            "shortness of breath",
            "syncope",
            "seizure",
            "hemoptysis",
        ])
        .with_vitals(vitals);
        assert!(model().score(&input) <= 1.0);
    }

    #[test]
    fn minor_itch_is_low_risk() {
        let assessment = model().score_with_confidence(&RiskInput::from_symptoms(["minor itch"]));
        assert!(assessment.score() < 0.30);
        assert_eq!(assessment.band(), RiskBand::Low);
    }

    #[test]
    fn baseline_never_reaches_critical() {
        let vitals = Vitals {
            bp: Some(BloodPressure::new(190, 125).unwrap()),
            heart_rate: Some(140.0),
            spo2: Some(85.0),
            temperature_c: Some(40.0),
            respiratory_rate: Some(34.0),
        };
        let input = RiskInput::from_symptoms(["confusion", "vomiting", "fever", "headache"])
            .with_vitals(vitals);
        let score = model().score(&input);
        assert!(score < 0.85);
        assert!((score - 0.84).abs() < 1e-5);
    }

    #[test]
    fn missing_vitals_degrades_gracefully() {
        let assessment = model().score_with_confidence(&RiskInput::from_symptoms(["cough"]));
        assert!((0.0..=1.0).contains(&assessment.score()));
        assert_eq!(assessment.degraded_signals(), [DegradedSignal::MissingVitals]);
    }

    #[test]
    fn empty_input_degrades_gracefully() {
        let assessment = model().score_with_confidence(&RiskInput::default());
        assert_eq!(assessment.score(), 0.0);
        assert_eq!(
            assessment.degraded_signals(),
            [DegradedSignal::MissingVitals, DegradedSignal::NoSymptoms]
        );
        assert!(assessment.human_review_required());
    }

    #[test]
    fn unrecognised_symptom_needs_review() {
        let assessment =
            model().score_with_confidence(&RiskInput::from_symptoms(["unspecified discomfort"]));
        assert!(assessment.confidence() < 0.70);
        assert!(assessment.human_review_required());
    }

    #[test]
    fn upstream_review_propagates() {
        let input = RiskInput {
            upstream_review_required: true,
            ..RiskInput::from_symptoms(["headache"]).with_vitals(bp(120, 80))
        };
        let assessment = model().score_with_confidence(&input);
        assert!(assessment.confidence() >= 0.70);
        assert!(assessment.human_review_required());
    }

    #[test]
    fn abnormal_vitals_raise_baseline() {
        let model = model();
        let calm = model.score(&RiskInput::from_symptoms(["headache"]).with_vitals(bp(120, 80)));
        let crisis = model.score(&RiskInput::from_symptoms(["headache"]).with_vitals(bp(185, 110)));
        assert!(crisis > calm);
    }

    #[test]
    fn comorbidities_raise_baseline() {
        let model = model();
        let plain = model.score(&RiskInput::from_symptoms(["headache"]));
        let input = RiskInput {
            medical_history: vec!["diabetes".into(), "Diabetes".into()],
            ..RiskInput::from_symptoms(["headache"])
        };
        assert!((model.score(&input) - plain - weights::COMORBIDITY).abs() < 1e-5);

        let many = RiskInput {
            medical_history: vec!["diabetes".into(), "asthma".into(), "copd".into()],
            ..RiskInput::from_symptoms(["headache"])
        };
        assert!((model.score(&many) - plain - weights::COMORBIDITY_CAP).abs() < 1e-5);
    }

    #[test]
    fn comorbidities_do_not_reach_critical() {
        let input = RiskInput {
            medical_history: vec!["heart failure".into(), "copd".into()],
            ..RiskInput::from_symptoms(["confusion", "palpitations"])
        };
        assert!(model().score(&input) < 0.85);
    }

    #[test]
    fn invalid_policy_rejected_at_construction() {
        let config = TriageConfig {
            thresholds: Thresholds {
                critical_risk: 1.2,
                ..Thresholds::default()
            },
            ..TriageConfig::default()
        };
        assert!(matches!(
            PolicyRiskModel::from_config(&config),
            Err(ConfigError::Invalid(_))
        ));

        let nan = TriageConfig {
            thresholds: Thresholds {
                critical_risk: f32::NAN,
                ..Thresholds::default()
            },
            ..TriageConfig::default()
        };
        assert!(PolicyRiskModel::from_config(&nan).is_err());
    }

    #[test]
    fn vitals_bump_tiers() {
        assert_eq!(vitals_bump(&Vitals::default()), 0.0);
        assert_eq!(vitals_bump(&bp(120, 80)), 0.0);
        assert!((vitals_bump(&bp(150, 95)) - vitals_policy::MILD).abs() < f32::EPSILON);
        assert!((vitals_bump(&bp(185, 100)) - vitals_policy::SEVERE).abs() < f32::EPSILON);

        let hypoxic = Vitals {
            spo2: Some(92.0),
            ..Vitals::default()
        };
        assert!((vitals_bump(&hypoxic) - vitals_policy::MODERATE).abs() < f32::EPSILON);
    }

    #[test]
    fn custom_critical_set() {
        let config = TriageConfig {
            critical_symptoms: vec!["stridor".into()],
            ..TriageConfig::default()
        };
        let model = PolicyRiskModel::from_config(&config).unwrap();
        assert!(model.score(&RiskInput::from_symptoms(["stridor"])) >= 0.85);
        assert!(model.score(&RiskInput::from_symptoms(["chest pain"])) < 0.85);
    }

    #[test]
    fn shared_across_threads() {
        let model = model();
        let input = RiskInput::from_symptoms(["chest pain"]).with_vitals(bp(150, 95));
        let expected = model.score_with_confidence(&input);

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| model.score_with_confidence(&input)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
