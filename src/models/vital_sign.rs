use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type of vital sign measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalType {
    BloodPressure,
    HeartRate,
    OxygenSaturation,
    Temperature,
    RespiratoryRate,
}

impl VitalType {
    pub fn as_str(self) -> &'static str {
        match self {
            VitalType::BloodPressure => "blood_pressure",
            VitalType::HeartRate => "heart_rate",
            VitalType::OxygenSaturation => "oxygen_saturation",
            VitalType::Temperature => "temperature",
            VitalType::RespiratoryRate => "respiratory_rate",
        }
    }

    /// Default unit for this vital type.
    pub fn default_unit(self) -> &'static str {
        match self {
            VitalType::BloodPressure => "mmHg",
            VitalType::HeartRate => "bpm",
            VitalType::OxygenSaturation => "%",
            VitalType::Temperature => "°C",
            VitalType::RespiratoryRate => "breaths/min",
        }
    }

    /// Physiologically possible range. Readings outside it are recognition errors.
    pub fn plausible_range(self) -> (f32, f32) {
        match self {
            VitalType::BloodPressure => (30.0, 300.0),
            VitalType::HeartRate => (20.0, 250.0),
            VitalType::OxygenSaturation => (50.0, 100.0),
            VitalType::Temperature => (30.0, 45.0),
            VitalType::RespiratoryRate => (4.0, 70.0),
        }
    }

    pub fn is_plausible(self, value: f32) -> bool {
        let (lo, hi) = self.plausible_range();
        value.is_finite() && value >= lo && value <= hi
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BloodPressureError {
    #[error("blood pressure must be 'systolic/diastolic', got '{0}'")]
    Format(String),

    #[error("implausible blood pressure {systolic}/{diastolic}")]
    Implausible { systolic: u16, diastolic: u16 },
}

/// Blood pressure reading, serialised as `"systolic/diastolic"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BloodPressure {
    pub systolic: u16,
    pub diastolic: u16,
}

impl BloodPressure {
    pub fn new(systolic: u16, diastolic: u16) -> Result<Self, BloodPressureError> {
        let range = VitalType::BloodPressure;
        if !range.is_plausible(systolic as f32)
            || !range.is_plausible(diastolic as f32)
            || diastolic >= systolic
        {
            return Err(BloodPressureError::Implausible {
                systolic,
                diastolic,
            });
        }
        Ok(Self {
            systolic,
            diastolic,
        })
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

impl FromStr for BloodPressure {
    type Err = BloodPressureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sys, dia) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| BloodPressureError::Format(s.to_string()))?;
        let systolic = sys
            .trim()
            .parse()
            .map_err(|_| BloodPressureError::Format(s.to_string()))?;
        let diastolic = dia
            .trim()
            .parse()
            .map_err(|_| BloodPressureError::Format(s.to_string()))?;
        Self::new(systolic, diastolic)
    }
}

impl TryFrom<String> for BloodPressure {
    type Error = BloodPressureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodPressure> for String {
    fn from(bp: BloodPressure) -> Self {
        bp.to_string()
    }
}

/// Vital signs found in a clinical artifact. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vitals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bp: Option<BloodPressure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spo2: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<f32>,
}

impl Vitals {
    pub fn is_empty(&self) -> bool {
        self.bp.is_none()
            && self.heart_rate.is_none()
            && self.spo2.is_none()
            && self.temperature_c.is_none()
            && self.respiratory_rate.is_none()
    }

    /// Number of recorded measurements.
    pub fn count(&self) -> usize {
        [
            self.bp.is_some(),
            self.heart_rate.is_some(),
            self.spo2.is_some(),
            self.temperature_c.is_some(),
            self.respiratory_rate.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bp_parses_and_displays() {
        let bp: BloodPressure = "150/95".parse().unwrap();
        assert_eq!(bp.systolic, 150);
        assert_eq!(bp.diastolic, 95);
        assert_eq!(bp.to_string(), "150/95");
    }

    #[test]
    fn bp_tolerates_spaces() {
        let bp: BloodPressure = " 120 / 80 ".parse().unwrap();
        assert_eq!(bp.to_string(), "120/80");
    }

    #[test]
    fn bp_rejects_garbage() {
        assert!(matches!(
            "150-95".parse::<BloodPressure>(),
            Err(BloodPressureError::Format(_))
        ));
        assert!(matches!(
            "abc/def".parse::<BloodPressure>(),
            Err(BloodPressureError::Format(_))
        ));
    }

    #[test]
    fn bp_rejects_inverted_reading() {
        assert!(matches!(
            BloodPressure::new(80, 120),
            Err(BloodPressureError::Implausible { .. })
        ));
    }

    #[test]
    fn bp_serializes_as_string() {
        let vitals = Vitals {
            bp: Some(BloodPressure::new(160, 100).unwrap()),
            ..Default::default()
        };
        let json = serde_json::to_value(vitals).unwrap();
        assert_eq!(json["bp"], "160/100");
        assert!(json.get("heart_rate").is_none());
    }

    #[test]
    fn bp_deserialize_rejects_invalid() {
        let result: Result<Vitals, _> = serde_json::from_str(r#"{"bp": "high"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn vitals_count_and_empty() {
        assert!(Vitals::default().is_empty());
        let vitals = Vitals {
            heart_rate: Some(88.0),
            spo2: Some(97.0),
            ..Default::default()
        };
        assert!(!vitals.is_empty());
        assert_eq!(vitals.count(), 2);
    }

    #[test]
    fn plausibility_bounds() {
        assert!(VitalType::OxygenSaturation.is_plausible(94.0));
        assert!(!VitalType::OxygenSaturation.is_plausible(140.0));
        assert!(!VitalType::HeartRate.is_plausible(f32::NAN));
    }
}
