use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: '{value}'")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(RiskBand {
    Critical => "critical",
    Elevated => "elevated",
    Low => "low",
});

str_enum!(FindingKind {
    Symptom => "symptom",
    Condition => "condition",
});

str_enum!(ArtifactKind {
    Document => "document",
    Note => "note",
});

impl RiskBand {
    /// Place a score in its display band.
    pub fn from_score(score: f32, thresholds: &crate::config::Thresholds) -> Self {
        if score >= thresholds.critical_risk {
            RiskBand::Critical
        } else if score >= thresholds.elevated_risk {
            RiskBand::Elevated
        } else {
            RiskBand::Low
        }
    }

    /// CSS colour used by the clinician display. Critical scores are red.
    pub fn css_color(&self) -> &'static str {
        match self {
            RiskBand::Critical => "rgb(255, 0, 0)",
            RiskBand::Elevated => "rgb(255, 165, 0)",
            RiskBand::Low => "rgb(0, 128, 0)",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            RiskBand::Critical => "high-risk",
            RiskBand::Elevated => "elevated-risk",
            RiskBand::Low => "low-risk",
        }
    }
}
