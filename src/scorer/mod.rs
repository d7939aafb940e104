// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Coordinates, Hazard};

mod risk;
mod strategy;

pub use risk::{classify_risk, RiskLevel};
pub use strategy::{
    ArithmeticContextual, ArithmeticSpatial, ContextualScoringStrategy, SpatialScoringStrategy,
};

/// Score substituted whenever a location can't be scored.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Weight of hazard types absent from the weight table.
pub const DEFAULT_HAZARD_WEIGHT: f64 = 0.3;

/// Hazard type used when no hazard is close enough to a location.
pub const UNKNOWN_HAZARD: &str = "unknown";

/// Half-width (in degrees) of the window in which hazards count as "nearby"
/// when scoring a single location or a routing node.
pub const NEARBY_WINDOW: f64 = 0.1;

/// Half-width (in degrees) of the window in which hazards count as "nearby"
/// in [SafetyScorer::score_route].
pub const ROUTE_POINT_WINDOW: f64 = 0.05;

const REFERENCE_HAZARD_WEIGHTS: [(&str, f64); 3] = [
    ("no streetlight", 0.3),
    ("unsafe area", 0.5),
    ("stray animals", 0.2),
];

/// Internal faults of the scoring pipeline. These never fail a routing request,
/// see [Scored::Degraded].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("non-finite coordinates: ({0}, {1})")]
    InvalidCoordinates(f64, f64),

    #[error("{stage} score is not finite: {value}")]
    NonFinite { stage: &'static str, value: f64 },

    #[error("model failure: {0}")]
    Model(String),
}

/// Outcome of scoring a location: either a computed score,
/// or the [NEUTRAL_SCORE] substituted after a [ScoringError].
#[derive(Debug, Clone, PartialEq)]
pub enum Scored {
    Computed(f64),
    Degraded(ScoringError),
}

impl Scored {
    /// Returns the usable score - the computed one or [NEUTRAL_SCORE].
    pub fn value(&self) -> f64 {
        match self {
            Self::Computed(score) => *score,
            Self::Degraded(_) => NEUTRAL_SCORE,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// Result of scoring a standalone location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationScore {
    pub latitude: f64,
    pub longitude: f64,
    pub hazard_type: String,
    pub safety_score: f64,
    pub risk_level: RiskLevel,
    pub nearby_hazards_count: usize,

    /// Set if the score is the neutral fallback.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

/// Safety of a single point of a scored route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointScore {
    pub lat: f64,
    pub lon: f64,
    pub safety_score: f64,
    pub nearby_hazards: usize,
}

/// Result of [SafetyScorer::score_route].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteScore {
    pub route_safety_score: f64,
    pub waypoint_scores: Vec<PointScore>,
    pub risk_level: RiskLevel,
}

/// Returns the type of the first hazard in the `window` around a position
/// (or [UNKNOWN_HAZARD]) and the number of all such hazards.
pub fn hazard_context(hazards: &[Hazard], lat: f64, lon: f64, window: f64) -> (&str, usize) {
    let mut nearby = hazards.iter().filter(|h| h.is_within_window(lat, lon, window));
    match nearby.next() {
        Some(first) => (first.hazard_type.as_str(), 1 + nearby.count()),
        None => (UNKNOWN_HAZARD, 0),
    }
}

/// Deterministic location safety scoring.
///
/// The final score blends a [spatial](SpatialScoringStrategy) and a
/// [contextual](ContextualScoringStrategy) sub-score with the weight of the hazard type:
///
/// ```text
/// combined = 0.4 * spatial + 0.4 * contextual + 0.2 * (1 - hazard_weight)
/// penalty  = min(0.05 * nearby_hazards, 0.3)
/// score    = clamp(combined - penalty, 0, 1)
/// ```
///
/// Scoring never fails: internal faults are logged and replaced by [NEUTRAL_SCORE].
pub struct SafetyScorer {
    spatial: Box<dyn SpatialScoringStrategy>,
    contextual: Box<dyn ContextualScoringStrategy>,
    hazard_weights: HashMap<String, f64>,
}

impl Default for SafetyScorer {
    fn default() -> Self {
        Self::new(ArithmeticSpatial, ArithmeticContextual)
    }
}

impl std::fmt::Debug for SafetyScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyScorer")
            .field("hazard_weights", &self.hazard_weights)
            .finish_non_exhaustive()
    }
}

impl SafetyScorer {
    /// Creates a scorer with the provided strategies and the reference hazard weights.
    pub fn new<S, C>(spatial: S, contextual: C) -> Self
    where
        S: SpatialScoringStrategy + 'static,
        C: ContextualScoringStrategy + 'static,
    {
        Self {
            spatial: Box::new(spatial),
            contextual: Box::new(contextual),
            hazard_weights: REFERENCE_HAZARD_WEIGHTS
                .iter()
                .map(|&(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    /// Sets (or overrides) the weight of a hazard type.
    pub fn with_hazard_weight<S: Into<String>>(mut self, hazard_type: S, weight: f64) -> Self {
        self.hazard_weights.insert(hazard_type.into(), weight);
        self
    }

    /// Returns the weight of a hazard type, or [DEFAULT_HAZARD_WEIGHT] for unknown types.
    pub fn hazard_weight(&self, hazard_type: &str) -> f64 {
        self.hazard_weights
            .get(hazard_type)
            .copied()
            .unwrap_or(DEFAULT_HAZARD_WEIGHT)
    }

    /// Scores a location given the closest hazard type and the number of hazards around.
    pub fn score_location(
        &self,
        lat: f64,
        lon: f64,
        hazard_type: &str,
        nearby_hazards: usize,
    ) -> Scored {
        match self.try_score_location(lat, lon, hazard_type, nearby_hazards) {
            Ok(score) => Scored::Computed(score),
            Err(e) => {
                log::warn!("scoring ({}, {}) failed, using neutral score: {}", lat, lon, e);
                Scored::Degraded(e)
            }
        }
    }

    fn try_score_location(
        &self,
        lat: f64,
        lon: f64,
        hazard_type: &str,
        nearby_hazards: usize,
    ) -> Result<f64, ScoringError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(ScoringError::InvalidCoordinates(lat, lon));
        }

        // Floor modulo: negative coordinates wrap to a non-negative remainder,
        // e.g. -30 → 60 for latitudes.
        let lat_norm = lat.rem_euclid(90.0) / 90.0;
        let lon_norm = lon.rem_euclid(180.0) / 180.0;

        let hazard_weight = self.hazard_weight(hazard_type);
        let spatial = ensure_finite("spatial", self.spatial.spatial_score(lat_norm, lon_norm)?)?;
        let contextual = ensure_finite(
            "contextual",
            self.contextual.contextual_score(hazard_type, nearby_hazards)?,
        )?;

        let combined = 0.4 * spatial + 0.4 * contextual + 0.2 * (1.0 - hazard_weight);
        let penalty = (nearby_hazards as f64 * 0.05).min(0.3);
        let score = ensure_finite("combined", combined - penalty)?;
        Ok(score.clamp(0.0, 1.0))
    }

    /// Scores a location and wraps the result with its [RiskLevel].
    pub fn assess(
        &self,
        lat: f64,
        lon: f64,
        hazard_type: &str,
        nearby_hazards: usize,
    ) -> LocationScore {
        let scored = self.score_location(lat, lon, hazard_type, nearby_hazards);
        let safety_score = scored.value();
        LocationScore {
            latitude: lat,
            longitude: lon,
            hazard_type: hazard_type.to_string(),
            safety_score,
            risk_level: classify_risk(safety_score),
            nearby_hazards_count: nearby_hazards,
            degraded: scored.is_degraded(),
        }
    }

    /// Scores every point of a route against the provided hazards.
    ///
    /// The route score is the mean of the point scores, or [NEUTRAL_SCORE]
    /// for an empty route.
    pub fn score_route(&self, points: &[Coordinates], hazards: &[Hazard]) -> RouteScore {
        let waypoint_scores: Vec<PointScore> = points
            .iter()
            .map(|p| {
                let (hazard_type, nearby) =
                    hazard_context(hazards, p.lat, p.lon, ROUTE_POINT_WINDOW);
                PointScore {
                    lat: p.lat,
                    lon: p.lon,
                    safety_score: self.score_location(p.lat, p.lon, hazard_type, nearby).value(),
                    nearby_hazards: nearby,
                }
            })
            .collect();

        let route_safety_score = mean(waypoint_scores.iter().map(|s| s.safety_score));
        RouteScore {
            route_safety_score,
            waypoint_scores,
            risk_level: classify_risk(route_safety_score),
        }
    }
}

/// Arithmetic mean of the scores, or [NEUTRAL_SCORE] if there are none.
pub(crate) fn mean<I: IntoIterator<Item = f64>>(scores: I) -> f64 {
    let (sum, count) = scores
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        NEUTRAL_SCORE
    } else {
        sum / count as f64
    }
}

fn ensure_finite(stage: &'static str, value: f64) -> Result<f64, ScoringError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScoringError::NonFinite { stage, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-9),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    struct FailingSpatial;

    impl SpatialScoringStrategy for FailingSpatial {
        fn spatial_score(&self, _: f64, _: f64) -> Result<f64, ScoringError> {
            Err(ScoringError::Model("weights not loaded".to_string()))
        }
    }

    struct NanContextual;

    impl ContextualScoringStrategy for NanContextual {
        fn contextual_score(&self, _: &str, _: usize) -> Result<f64, ScoringError> {
            Ok(f64::NAN)
        }
    }

    #[test]
    fn reference_value_at_origin() {
        // 0.4 * 0.5 + 0.4 * 0.7 + 0.2 * (1 - 0.3)
        let s = SafetyScorer::default().score_location(0.0, 0.0, "unknown", 0);
        assert!(!s.is_degraded());
        assert_almost_eq!(s.value(), 0.62);
    }

    #[test]
    fn reference_value_with_hazards() {
        // spatial = 0.5 + 0.25 * (45 / 90) + 0.25 * (90 / 180) = 0.75
        // contextual = 0.7 - 0.2 = 0.5
        // combined = 0.3 + 0.2 + 0.2 * 0.5 = 0.6, penalty = 0.1
        let s = SafetyScorer::default().score_location(45.0, 90.0, "unsafe area", 2);
        assert_almost_eq!(s.value(), 0.5);
    }

    #[test]
    fn negative_coordinates_use_floor_modulo() {
        let scorer = SafetyScorer::default();

        // -45 mod 90 = 45, -90 mod 180 = 90
        assert_almost_eq!(
            scorer.score_location(-45.0, -90.0, "unknown", 0).value(),
            scorer.score_location(45.0, 90.0, "unknown", 0).value()
        );

        // -30 mod 90 = 60, -150 mod 180 = 30
        // spatial = 0.5 + 0.25 * (60 / 90) + 0.25 * (30 / 180)
        let spatial = 0.5 + 0.25 * (60.0 / 90.0) + 0.25 * (30.0 / 180.0);
        let expected = 0.4 * spatial + 0.4 * 0.7 + 0.2 * 0.7;
        assert_almost_eq!(
            scorer.score_location(-30.0, -150.0, "unknown", 0).value(),
            expected
        );
    }

    #[test]
    fn unknown_hazard_type_uses_default_weight() {
        let scorer = SafetyScorer::default();
        assert_eq!(scorer.hazard_weight("falling rocks"), DEFAULT_HAZARD_WEIGHT);

        let unknown = scorer.score_location(10.0, 20.0, "falling rocks", 1);
        let streetlight = scorer.score_location(10.0, 20.0, "no streetlight", 1);
        assert!(!unknown.is_degraded());
        assert_almost_eq!(unknown.value(), streetlight.value());
    }

    #[test]
    fn hazard_weights_order_scores() {
        let scorer = SafetyScorer::default();
        let animals = scorer.score_location(10.0, 20.0, "stray animals", 1).value();
        let streetlight = scorer.score_location(10.0, 20.0, "no streetlight", 1).value();
        let unsafe_area = scorer.score_location(10.0, 20.0, "unsafe area", 1).value();
        assert!(animals > streetlight);
        assert!(streetlight > unsafe_area);
    }

    #[test]
    fn custom_hazard_weight() {
        let scorer = SafetyScorer::default().with_hazard_weight("flooding", 1.0);
        assert_eq!(scorer.hazard_weight("flooding"), 1.0);
        // 0.2 + 0.28 + 0.0
        assert_almost_eq!(scorer.score_location(0.0, 0.0, "flooding", 0).value(), 0.48);
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let scorer = SafetyScorer::default()
            .with_hazard_weight("catastrophe", 5.0)
            .with_hazard_weight("blessing", -5.0);
        for &hazard_type in &["unknown", "unsafe area", "catastrophe", "blessing"] {
            for nearby in [0, 1, 3, 6, 10, 1000] {
                for lat in [-90.0, -45.5, -0.001, 0.0, 33.3, 89.999, 90.0] {
                    for lon in [-180.0, -179.9, -1.0, 0.0, 1.0, 120.0, 180.0] {
                        let s = scorer.score_location(lat, lon, hazard_type, nearby).value();
                        assert!((0.0..=1.0).contains(&s), "{} at ({}, {})", s, lat, lon);
                    }
                }
            }
        }
    }

    #[test]
    fn density_penalty_is_capped() {
        let scorer = SafetyScorer::default();
        // contextual is 0 from 7 hazards on; the penalty stops growing at 6.
        assert_almost_eq!(
            scorer.score_location(0.0, 0.0, "unknown", 10).value(),
            scorer.score_location(0.0, 0.0, "unknown", 100).value()
        );
        // 0.2 + 0 + 0.14 - 0.3
        assert_almost_eq!(scorer.score_location(0.0, 0.0, "unknown", 10).value(), 0.04);
    }

    #[test]
    fn failing_strategy_degrades_to_neutral() {
        let scorer = SafetyScorer::new(FailingSpatial, ArithmeticContextual);
        let s = scorer.score_location(10.0, 10.0, "unsafe area", 0);
        assert_eq!(
            s,
            Scored::Degraded(ScoringError::Model("weights not loaded".to_string()))
        );
        assert_eq!(s.value(), NEUTRAL_SCORE);

        let scorer = SafetyScorer::new(ArithmeticSpatial, NanContextual);
        let s = scorer.score_location(10.0, 10.0, "unsafe area", 0);
        assert!(s.is_degraded());
        assert_eq!(s.value(), NEUTRAL_SCORE);
    }

    #[test]
    fn non_finite_coordinates_degrade_to_neutral() {
        let scorer = SafetyScorer::default();
        let s = scorer.score_location(f64::NAN, 0.0, "unknown", 0);
        assert!(matches!(s, Scored::Degraded(ScoringError::InvalidCoordinates(..))));
        assert_eq!(s.value(), NEUTRAL_SCORE);

        let assessed = scorer.assess(0.0, f64::INFINITY, "unknown", 0);
        assert!(assessed.degraded);
        assert_eq!(assessed.safety_score, NEUTRAL_SCORE);
        assert_eq!(assessed.risk_level, RiskLevel::ModerateRisk);
    }

    #[test]
    fn assess_reports_risk_and_count() {
        let assessed = SafetyScorer::default().assess(0.0, 0.0, "unknown", 0);
        assert_almost_eq!(assessed.safety_score, 0.62);
        assert_eq!(assessed.risk_level, RiskLevel::Safe);
        assert_eq!(assessed.nearby_hazards_count, 0);
        assert!(!assessed.degraded);

        let json = serde_json::to_value(&assessed).unwrap();
        assert_eq!(json["risk_level"], "SAFE");
        assert!(json.get("degraded").is_none());
    }

    #[test]
    fn empty_route_is_neutral() {
        let r = SafetyScorer::default().score_route(&[], &[]);
        assert_eq!(r.route_safety_score, NEUTRAL_SCORE);
        assert!(r.waypoint_scores.is_empty());
        assert_eq!(r.risk_level, RiskLevel::ModerateRisk);
    }

    #[test]
    fn route_score_is_mean_of_points() {
        let hazards = vec![
            Hazard::new(0.01, 0.01, "unsafe area"),
            Hazard::new(0.02, 0.0, "stray animals"),
            Hazard::new(1.0, 1.0, "no streetlight"),
        ];
        let points = [
            Coordinates::new(0.0, 0.0),
            Coordinates::new(0.5, 0.5),
            Coordinates::new(1.03, 1.0),
        ];

        let r = SafetyScorer::default().score_route(&points, &hazards);
        assert_eq!(r.waypoint_scores.len(), 3);
        assert_eq!(r.waypoint_scores[0].nearby_hazards, 2);
        assert_eq!(r.waypoint_scores[1].nearby_hazards, 0);
        assert_eq!(r.waypoint_scores[2].nearby_hazards, 1);

        let expected_first = SafetyScorer::default()
            .score_location(0.0, 0.0, "unsafe area", 2)
            .value();
        assert_almost_eq!(r.waypoint_scores[0].safety_score, expected_first);

        let mean = r.waypoint_scores.iter().map(|p| p.safety_score).sum::<f64>() / 3.0;
        assert_almost_eq!(r.route_safety_score, mean);
        assert_eq!(r.risk_level, classify_risk(mean));
    }

    #[test]
    fn hazard_context_picks_first_match() {
        let hazards = vec![
            Hazard::new(5.0, 5.0, "unsafe area"),
            Hazard::new(0.05, 0.0, "stray animals"),
            Hazard::new(0.0, 0.05, "no streetlight"),
        ];
        assert_eq!(hazard_context(&hazards, 0.0, 0.0, 0.1), ("stray animals", 2));
        assert_eq!(hazard_context(&hazards, 0.0, 0.0, 0.05), (UNKNOWN_HAZARD, 0));
        assert_eq!(hazard_context(&[], 0.0, 0.0, 0.1), (UNKNOWN_HAZARD, 0));
    }
}
