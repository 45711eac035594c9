//! Vital-sign parsing from free text ("BP is 150/95", "SpO2 94%").

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::{BloodPressure, VitalType, Vitals};

const LINK: &str = r"\s*(?:is|was|of|at|:|=)?\s*";

static BLOOD_PRESSURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:bp|blood\s+pressure){LINK}(\d{{2,3}})\s*/\s*(\d{{2,3}})(?:\s*mm\s*hg)?\b"
    ))
    .expect("Invalid blood pressure regex")
});

static HEART_RATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:hr|heart\s+rate|pulse){LINK}(\d{{2,3}})(?:\s*(?:bpm|/\s*min))?\b"))
        .expect("Invalid heart rate regex")
});

static SPO2: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:spo2|sp02|o2\s*sat(?:uration)?|oxygen\s+saturation|sats?){LINK}(\d{{2,3}}(?:\.\d)?)\s*%?"
    ))
    .expect("Invalid SpO2 regex")
});

static TEMPERATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:temp(?:erature)?){LINK}(\d{{2,3}}(?:\.\d{{1,2}})?)\s*°?\s*([cf])?\b"
    ))
    .expect("Invalid temperature regex")
});

static RESPIRATORY_RATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:rr|resp(?:iratory)?\s+rate){LINK}(\d{{1,2}})(?:\s*(?:breaths)?\s*/\s*min)?\b"
    ))
    .expect("Invalid respiratory rate regex")
});

/// Parsed vitals plus readings dropped as implausible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VitalsParse {
    pub vitals: Vitals,
    pub rejected: Vec<(VitalType, String)>,
}

/// First plausible reading of each vital wins.
pub fn parse_vitals(text: &str) -> VitalsParse {
    let mut parse = VitalsParse::default();

    if let Some(caps) = BLOOD_PRESSURE.captures(text) {
        let raw = format!("{}/{}", &caps[1], &caps[2]);
        match raw.parse::<BloodPressure>() {
            Ok(bp) => parse.vitals.bp = Some(bp),
            Err(_) => parse.rejected.push((VitalType::BloodPressure, raw)),
        }
    }

    parse.vitals.heart_rate = numeric(&HEART_RATE, text, VitalType::HeartRate, &mut parse.rejected);
    parse.vitals.spo2 = numeric(&SPO2, text, VitalType::OxygenSaturation, &mut parse.rejected);
    parse.vitals.respiratory_rate = numeric(
        &RESPIRATORY_RATE,
        text,
        VitalType::RespiratoryRate,
        &mut parse.rejected,
    );

    if let Some(caps) = TEMPERATURE.captures(text) {
        let raw = caps[0].trim().to_string();
        match temperature_celsius(&caps) {
            Some(c) if VitalType::Temperature.is_plausible(c) => parse.vitals.temperature_c = Some(c),
            _ => parse.rejected.push((VitalType::Temperature, raw)),
        }
    }

    parse
}

fn numeric(
    re: &Regex,
    text: &str,
    vital: VitalType,
    rejected: &mut Vec<(VitalType, String)>,
) -> Option<f32> {
    let caps = re.captures(text)?;
    let raw = &caps[1];
    match raw.parse::<f32>() {
        Ok(v) if vital.is_plausible(v) => Some(v),
        _ => {
            rejected.push((vital, raw.to_string()));
            None
        }
    }
}

/// Explicit `F`, or an unlabelled value above 50, is Fahrenheit.
fn temperature_celsius(caps: &Captures<'_>) -> Option<f32> {
    let value: f32 = caps[1].parse().ok()?;
    let fahrenheit = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(unit) => unit == "f",
        None => value > 50.0,
    };
    let celsius = if fahrenheit {
        (value - 32.0) * 5.0 / 9.0
    } else {
        value
    };
    Some((celsius * 10.0).round() / 10.0)
}
