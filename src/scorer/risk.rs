// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Discrete classification of a safety score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(C)]
pub enum RiskLevel {
    #[serde(rename = "HIGH RISK")]
    HighRisk = 0,

    #[serde(rename = "MODERATE RISK")]
    ModerateRisk = 1,

    #[serde(rename = "SAFE")]
    Safe = 2,

    #[serde(rename = "VERY SAFE")]
    VerySafe = 3,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::HighRisk => "HIGH RISK",
            Self::ModerateRisk => "MODERATE RISK",
            Self::Safe => "SAFE",
            Self::VerySafe => "VERY SAFE",
        })
    }
}

/// Classifies a safety score into a [RiskLevel].
///
/// Lower bounds of each band are inclusive: `[0.8, ∞)` is very safe, `[0.6, 0.8)` safe,
/// `[0.4, 0.6)` moderate risk and everything below (including NaN) high risk.
pub fn classify_risk(score: f64) -> RiskLevel {
    if score >= 0.8 {
        RiskLevel::VerySafe
    } else if score >= 0.6 {
        RiskLevel::Safe
    } else if score >= 0.4 {
        RiskLevel::ModerateRisk
    } else {
        RiskLevel::HighRisk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(classify_risk(1.0), RiskLevel::VerySafe);
        assert_eq!(classify_risk(0.8), RiskLevel::VerySafe);
        assert_eq!(classify_risk(0.799_999_999), RiskLevel::Safe);
        assert_eq!(classify_risk(0.6), RiskLevel::Safe);
        assert_eq!(classify_risk(0.599_999_999), RiskLevel::ModerateRisk);
        assert_eq!(classify_risk(0.4), RiskLevel::ModerateRisk);
        assert_eq!(classify_risk(0.399_999_999), RiskLevel::HighRisk);
        assert_eq!(classify_risk(0.0), RiskLevel::HighRisk);
        assert_eq!(classify_risk(f64::NAN), RiskLevel::HighRisk);
    }

    #[test]
    fn bands_are_monotonic() {
        let mut previous = RiskLevel::HighRisk;
        for i in 0..=1000 {
            let level = classify_risk(i as f64 / 1000.0);
            assert!(level >= previous, "{} at {}", level, i);
            previous = level;
        }
        assert_eq!(previous, RiskLevel::VerySafe);
    }

    #[test]
    fn serializes_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&RiskLevel::ModerateRisk).unwrap(),
            "\"MODERATE RISK\""
        );
        assert_eq!(RiskLevel::VerySafe.to_string(), "VERY SAFE");
    }
}
